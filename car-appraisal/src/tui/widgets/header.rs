// Header bar (title + attempt phase) and the help bar.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::Phase;
use crate::tui::ViewState;

/// Render the header into the given area.
///
/// Layout: [title] | [phase indicator]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color) = phase_indicator(state.phase);
    let spans = vec![
        Span::styled(
            " Car Appraisal ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(Color::Gray)),
        Span::styled(format!("{dot} "), Style::default().fg(dot_color)),
        Span::styled(phase_label(state.phase), Style::default().fg(Color::White)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Render the key hints. While pending only quitting is possible.
pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = help_text(state.is_pending());
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(pending: bool) -> &'static str {
    if pending {
        " Calculating... | Ctrl-C:Quit"
    } else {
        " Enter:Calculate | Tab:Next field | Ctrl-T:Input mode | Ctrl-P:Progress | Esc:Dismiss | Ctrl-C:Quit"
    }
}

/// Return the phase dot character and its color.
pub fn phase_indicator(phase: Phase) -> (&'static str, Color) {
    match phase {
        Phase::Idle => ("●", Color::DarkGray),
        Phase::Validating => ("●", Color::Cyan),
        Phase::Submitting | Phase::Progressing => ("●", Color::Yellow),
        Phase::Settled => ("●", Color::Green),
    }
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Ready",
        Phase::Validating => "Validating",
        Phase::Submitting => "Submitting",
        Phase::Progressing => "In progress",
        Phase::Settled => "Done",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::render_to_string;

    #[test]
    fn phase_indicator_colors() {
        assert_eq!(phase_indicator(Phase::Idle).1, Color::DarkGray);
        assert_eq!(phase_indicator(Phase::Submitting).1, Color::Yellow);
        assert_eq!(phase_indicator(Phase::Progressing).1, Color::Yellow);
        assert_eq!(phase_indicator(Phase::Settled).1, Color::Green);
    }

    #[test]
    fn help_text_while_pending_only_offers_quit() {
        assert!(help_text(true).contains("Calculating..."));
        assert!(!help_text(true).contains("Enter"));
        assert!(help_text(false).contains("Enter:Calculate"));
    }

    #[test]
    fn header_shows_phase_label() {
        let mut state = ViewState::default();
        state.phase = Phase::Progressing;
        let screen = render_to_string(60, 1, |frame| render(frame, frame.area(), &state));
        assert!(screen.contains("Car Appraisal"));
        assert!(screen.contains("In progress"));
    }

    #[test]
    fn help_renders_without_panic() {
        let state = ViewState::default();
        render_to_string(20, 1, |frame| render_help(frame, frame.area(), &state));
    }
}
