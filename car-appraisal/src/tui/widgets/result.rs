// Result panel: the settled valuation, or the error of the last attempt.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::format::{format_clp, format_km};
use crate::protocol::ValuationResult;
use crate::tui::ViewState;

const LABEL_WIDTH: usize = 17;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if let Some(message) = &state.error {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Esc to dismiss",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = match &state.result {
        Some(result) => result_lines(result)
            .into_iter()
            .map(|(label, value)| {
                let value_style = if label == "Estimated price" {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {:<width$}", label, width = LABEL_WIDTH),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(value, value_style),
                ])
            })
            .collect(),
        None => vec![Line::from(Span::styled(
            " Fill in the form and press Enter to calculate.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Valuation"));
    frame.render_widget(paragraph, area);
}

/// Rows of the result panel as (label, formatted value).
///
/// Purchase price and mileage only appear when present and non-zero.
pub fn result_lines(result: &ValuationResult) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    if let Some(plate) = &result.plate {
        rows.push(("Plate", plate.clone()));
    }
    if let Some(vehicle) = &result.vehicle_data {
        rows.push(("Brand", vehicle.brand.clone()));
        rows.push(("Model", vehicle.model.clone()));
        rows.push(("Year", vehicle.year.to_string()));
        if let Some(version) = vehicle.version.as_ref().filter(|v| !v.is_empty()) {
            rows.push(("Version", version.clone()));
        }
    }

    rows.push(("Estimated price", format_clp(result.estimated_price)));

    if let Some(price) = result.purchase_price.filter(|p| *p != 0.0) {
        rows.push(("Purchase price", format_clp(price)));
    }
    if let Some(km) = result.kilometers.filter(|km| *km != 0) {
        rows.push(("Mileage", format_km(km)));
    }

    rows.push(("Observation", result.message.clone()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fakes::ok_result;
    use crate::protocol::VehicleData;
    use crate::tui::test_support::render_to_string;

    #[test]
    fn minimal_result() {
        let rows = result_lines(&ok_result(5_000_000.0, "ok"));
        assert_eq!(
            rows,
            vec![
                ("Estimated price", "$5.000.000".to_string()),
                ("Observation", "ok".to_string()),
            ]
        );
    }

    #[test]
    fn plate_result_with_purchase_price_and_mileage() {
        let mut result = ok_result(8_500_000.0, "Valuación completada");
        result.plate = Some("ABC123".into());
        result.purchase_price = Some(7_225_000.0);
        result.kilometers = Some(50_000);

        let rows = result_lines(&result);
        assert_eq!(rows[0], ("Plate", "ABC123".to_string()));
        assert!(rows.contains(&("Purchase price", "$7.225.000".to_string())));
        assert!(rows.contains(&("Mileage", "50.000 km".to_string())));
        assert_eq!(rows.last().unwrap().0, "Observation");
    }

    #[test]
    fn zero_purchase_price_and_mileage_are_hidden() {
        let mut result = ok_result(1_000.0, "ok");
        result.purchase_price = Some(0.0);
        result.kilometers = Some(0);
        let labels: Vec<_> = result_lines(&result).into_iter().map(|(l, _)| l).collect();
        assert!(!labels.contains(&"Purchase price"));
        assert!(!labels.contains(&"Mileage"));
    }

    #[test]
    fn vehicle_result_rows() {
        let mut result = ok_result(12_000_000.0, "ok");
        result.vehicle_data = Some(VehicleData {
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2020,
            version: None,
        });
        let labels: Vec<_> = result_lines(&result).into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec!["Brand", "Model", "Year", "Estimated price", "Observation"]
        );
    }

    #[test]
    fn error_replaces_result() {
        let mut state = ViewState::default();
        state.result = Some(ok_result(1.0, "ok"));
        state.error = Some("The plate is required".into());
        let screen = render_to_string(60, 6, |frame| render(frame, frame.area(), &state));
        assert!(screen.contains("The plate is required"));
        assert!(!screen.contains("Estimated price"));
    }

    #[test]
    fn empty_state_shows_hint() {
        let state = ViewState::default();
        let screen = render_to_string(60, 4, |frame| render(frame, frame.area(), &state));
        assert!(screen.contains("press Enter"));
    }
}
