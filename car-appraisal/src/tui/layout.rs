// Screen layout: zone arrangement and sizing.
//
// +--------------------------------------------------+
// | Header (1 row): title + phase                     |
// +--------------------------------------------------+
// | Options (4 rows): input mode + progress toggle    |
// +--------------------------------------------------+
// | Form (one row per field + borders)                |
// +--------------------------------------------------+
// | Progress (5 rows)                                 |
// +--------------------------------------------------+
// | Result / error (fill)                             |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub header: Rect,
    pub options: Rect,
    pub form: Rect,
    pub progress: Rect,
    pub result: Rect,
    pub help_bar: Rect,
}

/// Height of the options block (two lines plus borders).
const OPTIONS_HEIGHT: u16 = 4;
/// Height of the progress block (gauge, message, step counter plus borders).
const PROGRESS_HEIGHT: u16 = 5;

/// Build the layout for a form showing `field_count` fields.
pub fn build_layout(area: Rect, field_count: usize) -> AppLayout {
    let form_height = field_count as u16 + 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // header
            Constraint::Length(OPTIONS_HEIGHT),  // options
            Constraint::Length(form_height),     // form
            Constraint::Length(PROGRESS_HEIGHT), // progress
            Constraint::Min(3),                  // result / error
            Constraint::Length(1),               // help bar
        ])
        .split(area);

    AppLayout {
        header: vertical[0],
        options: vertical[1],
        form: vertical[2],
        progress: vertical[3],
        result: vertical[4],
        help_bar: vertical[5],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 100, 40)
    }

    #[test]
    fn zones_stack_without_overlap() {
        let layout = build_layout(test_area(), 5);
        let zones = [
            layout.header,
            layout.options,
            layout.form,
            layout.progress,
            layout.result,
            layout.help_bar,
        ];
        for pair in zones.windows(2) {
            assert_eq!(pair[0].y + pair[0].height, pair[1].y);
        }
        assert_eq!(layout.help_bar.y + layout.help_bar.height, 40);
    }

    #[test]
    fn fixed_zone_heights() {
        let layout = build_layout(test_area(), 2);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.options.height, OPTIONS_HEIGHT);
        assert_eq!(layout.form.height, 4);
        assert_eq!(layout.progress.height, PROGRESS_HEIGHT);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn form_grows_with_vehicle_fields() {
        let plate = build_layout(test_area(), 2);
        let vehicle = build_layout(test_area(), 5);
        assert_eq!(vehicle.form.height, plate.form.height + 3);
        assert!(vehicle.result.height < plate.result.height);
    }

    #[test]
    fn all_zones_span_full_width() {
        let layout = build_layout(test_area(), 5);
        for zone in [layout.header, layout.form, layout.result, layout.help_bar] {
            assert_eq!(zone.width, 100);
        }
    }
}
