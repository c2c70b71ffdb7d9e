// Progress widget: the latest progress event of the in-flight valuation.
//
// Gauge with the rounded percentage, then the server's message and the
// "Step i of n" counter. Shows a placeholder when no event is current.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use crate::protocol::{Phase, ProgressEvent};
use crate::tui::ViewState;

/// Render the progress panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "Valuation progress",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .border_style(border_style(state.phase));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(event) = &state.progress else {
        let text = placeholder_text(state.phase, state.progress_enabled);
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(gauge_ratio(event.percentage))
        .label(percent_label(event.percentage));
    frame.render_widget(gauge, rows[0]);

    frame.render_widget(Paragraph::new(event.message.clone()), rows[1]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            step_label(event),
            Style::default().fg(Color::Gray),
        ))),
        rows[2],
    );
}

/// Clamp a server percentage into the gauge's [0, 1] ratio.
pub fn gauge_ratio(percentage: f64) -> f64 {
    if percentage.is_finite() {
        (percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn percent_label(percentage: f64) -> String {
    if percentage.is_finite() {
        format!("{}%", percentage.round() as i64)
    } else {
        "--%".to_string()
    }
}

pub fn step_label(event: &ProgressEvent) -> String {
    format!("Step {} of {}", event.step, event.total_steps)
}

fn placeholder_text(phase: Phase, progress_enabled: bool) -> &'static str {
    match phase {
        Phase::Submitting | Phase::Progressing if progress_enabled => "Waiting for progress...",
        Phase::Submitting | Phase::Progressing => "Calculating...",
        _ if progress_enabled => "Progress is shown here while a valuation runs.",
        _ => "Detailed progress is off (Ctrl-P).",
    }
}

fn border_style(phase: Phase) -> Style {
    if phase.is_pending() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::render_to_string;

    fn event(step: u32, total: u32, percentage: f64, message: &str) -> ProgressEvent {
        ProgressEvent {
            step,
            total_steps: total,
            percentage,
            message: message.to_string(),
            session_id: None,
        }
    }

    #[test]
    fn ratio_is_clamped() {
        assert!((gauge_ratio(50.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(gauge_ratio(150.0), 1.0);
        assert_eq!(gauge_ratio(-3.0), 0.0);
        assert_eq!(gauge_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn percent_label_rounds() {
        assert_eq!(percent_label(42.857), "43%");
        assert_eq!(percent_label(100.0), "100%");
        assert_eq!(percent_label(f64::INFINITY), "--%");
    }

    #[test]
    fn step_label_format() {
        assert_eq!(step_label(&event(3, 10, 30.0, "x")), "Step 3 of 10");
    }

    #[test]
    fn placeholder_values() {
        assert_eq!(placeholder_text(Phase::Submitting, true), "Waiting for progress...");
        assert_eq!(placeholder_text(Phase::Submitting, false), "Calculating...");
        assert_eq!(
            placeholder_text(Phase::Idle, false),
            "Detailed progress is off (Ctrl-P)."
        );
    }

    #[test]
    fn renders_current_event() {
        let mut state = ViewState::default();
        state.phase = Phase::Progressing;
        state.progress = Some(event(2, 7, 28.571, "Consultando base de datos"));
        let screen = render_to_string(60, 5, |frame| render(frame, frame.area(), &state));
        assert!(screen.contains("29%"), "screen:\n{screen}");
        assert!(screen.contains("Consultando base de datos"));
        assert!(screen.contains("Step 2 of 7"));
    }

    #[test]
    fn renders_placeholder_without_event() {
        let state = ViewState::default();
        let screen = render_to_string(60, 5, |frame| render(frame, frame.area(), &state));
        assert!(screen.contains("Progress is shown here"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let mut state = ViewState::default();
        state.progress = Some(event(1, 1, 100.0, "done"));
        render_to_string(4, 2, |frame| render(frame, frame.area(), &state));
    }
}
