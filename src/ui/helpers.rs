use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Cell, Row};

use crate::error::RollError;
use crate::models::{Script, VoterRecord};

/// Column widths of the record table, ID first.
pub(crate) const TABLE_WIDTHS: [Constraint; 7] = [
    Constraint::Length(4),
    Constraint::Min(12),
    Constraint::Min(8),
    Constraint::Min(12),
    Constraint::Length(6),
    Constraint::Min(20),
    Constraint::Min(10),
];

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error. Domain
/// errors already carry their cause in the message, so they are shown whole.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(roll) = err.downcast_ref::<RollError>() {
        return roll.to_string();
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

pub(crate) fn header_row(script: Script) -> Row<'static> {
    let mut cells = vec![Cell::from("ID")];
    cells.extend(script.column_labels().into_iter().map(Cell::from));
    Row::new(cells).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

pub(crate) fn record_row(record: &VoterRecord) -> Row<'static> {
    Row::new(vec![
        Cell::from(record.id.to_string()),
        Cell::from(record.surname.clone()),
        Cell::from(record.given_name.clone()),
        Cell::from(record.patronymic.clone()),
        Cell::from(record.birth_year.to_string()),
        Cell::from(record.address.clone()),
        Cell::from(record.birth_city.clone()),
    ])
}

/// Plural-aware "N record(s)" for status lines.
pub(crate) fn records_phrase(count: usize) -> String {
    if count == 1 {
        "1 record".to_string()
    } else {
        format!("{count} records")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;
    use anyhow::Context;

    #[test]
    fn surface_error_keeps_domain_messages_whole() {
        let err = Error::new(RollError::from(ValidationError::AddressFormat));
        assert_eq!(surface_error(&err), RollError::from(ValidationError::AddressFormat).to_string());

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let chained = Err::<(), _>(io).context("saving").unwrap_err();
        assert_eq!(surface_error(&chained), "disk full");
    }

    #[test]
    fn records_phrase_pluralises() {
        assert_eq!(records_phrase(1), "1 record");
        assert_eq!(records_phrase(0), "0 records");
        assert_eq!(records_phrase(12), "12 records");
    }
}
