//! Fixed-width, pipe-delimited line layout shared by every flat file the
//! application writes, plus the reverse parser used by the sort and deletion
//! paths.

use crate::models::{RecordId, Script, VoterRecord};

/// Column delimiter between padded cells.
pub const DELIMITER: &str = " | ";
/// Widths, in characters, of `ID`, surname, given name, patronymic, year,
/// address and city.
pub const COLUMN_WIDTHS: [usize; 7] = [2, 20, 10, 15, 12, 28, 15];
/// Length of the dashed separator written under the header.
pub const SEPARATOR_WIDTH: usize = 122;

/// Header label of the identifier column; also how headers are recognised.
const ID_LABEL: &str = "ID";

/// Header and separator lines for a new file.
pub fn header_lines(script: Script) -> [String; 2] {
    let labels = script.column_labels();
    let mut header = format!("{:<width$}", ID_LABEL, width = COLUMN_WIDTHS[0]);
    for (label, width) in labels.iter().zip(COLUMN_WIDTHS[1..].iter().copied()) {
        header.push_str(DELIMITER);
        header.push_str(&format!("{label:<width$}"));
    }
    [header, "-".repeat(SEPARATOR_WIDTH)]
}

/// One record as a data line, padded by character count.
pub fn format_row(record: &VoterRecord) -> String {
    let [id_w, surname_w, given_w, patronymic_w, year_w, address_w, city_w] = COLUMN_WIDTHS;
    format!(
        "{:<id_w$}{d}{:<surname_w$}{d}{:<given_w$}{d}{:<patronymic_w$}{d}{:<year_w$}{d}{:<address_w$}{d}{:<city_w$}",
        record.id,
        record.surname,
        record.given_name,
        record.patronymic,
        record.birth_year,
        record.address,
        record.birth_city,
        d = DELIMITER,
    )
}

/// Classification of one line read back from a flat file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLine {
    /// Header, dashed separator or blank line. Always kept verbatim.
    Frame,
    Parsed(VoterRecord),
    Skipped { line: String, reason: String },
}

/// Header, separator or blank line.
pub fn is_frame_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.chars().all(|ch| ch == '-')
        || line.split('|').next().map(str::trim) == Some(ID_LABEL)
}

/// Parse only the leading identifier cell of a data line.
pub fn leading_id(line: &str) -> Result<RecordId, String> {
    let token = line.split('|').next().unwrap_or_default().trim();
    token
        .parse::<RecordId>()
        .map_err(|err| format!("invalid ID '{token}': {err}"))
}

/// Parse a full line into a record.
pub fn parse_line(line: &str) -> CacheLine {
    if is_frame_line(line) {
        return CacheLine::Frame;
    }
    match parse_record(line) {
        Ok(record) => CacheLine::Parsed(record),
        Err(reason) => CacheLine::Skipped {
            line: line.to_string(),
            reason,
        },
    }
}

fn parse_record(line: &str) -> Result<VoterRecord, String> {
    let cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.len() != COLUMN_WIDTHS.len() {
        return Err(format!(
            "expected {} columns, found {}",
            COLUMN_WIDTHS.len(),
            cells.len()
        ));
    }

    let id = leading_id(line)?;
    let birth_year = cells[4]
        .parse::<i32>()
        .map_err(|err| format!("invalid birth year '{}': {err}", cells[4]))?;

    Ok(VoterRecord {
        id,
        surname: cells[1].to_string(),
        given_name: cells[2].to_string(),
        patronymic: cells[3].to_string(),
        birth_year,
        address: cells[5].to_string(),
        birth_city: cells[6].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VoterRecord {
        VoterRecord {
            id: 1,
            surname: "Петров".into(),
            given_name: "Иван".into(),
            patronymic: "Иванович".into(),
            birth_year: 1990,
            address: "Ул. Ленина, д. 10, кв. 5".into(),
            birth_city: "Казань".into(),
        }
    }

    #[test]
    fn rows_pad_by_characters_not_bytes() {
        let row = format_row(&record());
        let cells: Vec<&str> = row.split(" | ").collect();
        assert_eq!(cells.len(), 7);
        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            assert_eq!(cell.chars().count(), width, "cell {cell:?}");
        }
        assert!(row.starts_with("1  | Петров"));
    }

    #[test]
    fn headers_are_frame_lines() {
        for script in [Script::Cyrillic, Script::Latin] {
            let [header, separator] = header_lines(script);
            assert!(is_frame_line(&header));
            assert!(is_frame_line(&separator));
            assert_eq!(separator.len(), SEPARATOR_WIDTH);
            assert_eq!(parse_line(&header), CacheLine::Frame);
        }
        assert!(is_frame_line(""));
        assert!(!is_frame_line(&format_row(&record())));
    }

    #[test]
    fn formatted_rows_parse_back() {
        let original = record();
        assert_eq!(
            parse_line(&format_row(&original)),
            CacheLine::Parsed(original)
        );
    }

    #[test]
    fn malformed_lines_are_skipped_with_a_reason() {
        match parse_line("abc | Петров") {
            CacheLine::Skipped { line, reason } => {
                assert_eq!(line, "abc | Петров");
                assert!(reason.contains("columns"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match parse_line("7 | A | B | C | nineteen | D | E") {
            CacheLine::Skipped { reason, .. } => assert!(reason.contains("birth year")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn extra_cells_are_skipped_not_shifted() {
        let mut split = record();
        split.address = "Ул. Ле|нина, д. 10, кв. 5".into();
        match parse_line(&format_row(&split)) {
            CacheLine::Skipped { reason, .. } => {
                assert_eq!(reason, "expected 7 columns, found 8");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn leading_id_ignores_padding() {
        assert_eq!(leading_id("12 | whatever"), Ok(12));
        assert!(leading_id("x1 | whatever").is_err());
    }
}
