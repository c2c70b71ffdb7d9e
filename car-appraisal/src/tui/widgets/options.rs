// Options block: input-mode selector and the detailed-progress toggle.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::form::InputMode;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines = vec![
        mode_line(state.mode, state.is_pending()),
        Line::from(vec![
            Span::raw(" "),
            Span::raw(checkbox(state.progress_enabled)),
            Span::raw(" Show detailed progress  "),
            Span::styled("(Ctrl-P)", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("How do you want to identify the vehicle?"),
    );
    frame.render_widget(paragraph, area);
}

fn mode_line(active: InputMode, locked: bool) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for mode in [InputMode::Plate, InputMode::Vehicle] {
        let selected = mode == active;
        let mut style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        if locked {
            style = style.add_modifier(Modifier::DIM);
        }
        spans.push(Span::styled(
            format!("{} {}", radio(selected), mode.label()),
            style,
        ));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled("(Ctrl-T)", Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}

pub fn radio(selected: bool) -> &'static str {
    if selected {
        "(•)"
    } else {
        "( )"
    }
}

pub fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}
