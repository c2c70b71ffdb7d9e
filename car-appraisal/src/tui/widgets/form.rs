// Form widget: one row per field of the active input mode.
//
// The focused row is highlighted and shows a cursor; empty fields show their
// placeholder dimmed. While a request is pending the whole form is dimmed.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::form::FormField;
use crate::tui::ViewState;

/// Width the field labels are padded to.
const LABEL_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let lines: Vec<Line> = state
        .mode
        .fields()
        .iter()
        .map(|&field| field_line(state, field))
        .collect();

    let border_style = if state.is_pending() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let title = if state.is_pending() {
        "Vehicle -- calculating..."
    } else {
        "Vehicle"
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);
}

fn field_line(state: &ViewState, field: FormField) -> Line<'static> {
    let focused = field == state.focus && !state.is_pending();
    let value = state.fields.get(field);

    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let marker = if focused { ">" } else { " " };

    let mut spans = vec![Span::styled(
        format!("{marker} {:<width$}", field.label(), width = LABEL_WIDTH),
        label_style,
    )];

    if value.is_empty() {
        spans.push(Span::styled(
            field.placeholder(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
    } else {
        let value_style = if state.is_pending() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        spans.push(Span::styled(value.to_string(), value_style));
    }

    if focused {
        spans.push(Span::styled(
            "_",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    Line::from(spans)
}
