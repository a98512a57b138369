//! Sort engine. Both the live table and an exported flat file are loaded into
//! memory and ordered with the same comparator.

use std::cmp::Ordering;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::info;

use crate::db::query_voters;
use crate::error::Result;
use crate::export::{read_records, SkippedLine};
use crate::models::{Criterion, SortDirection, SortField, VoterRecord};

/// Where the records to sort come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSource {
    LiveTable,
    File(PathBuf),
}

/// Sorted records plus any file lines that could not be parsed.
#[derive(Debug, Clone, Default)]
pub struct SortOutcome {
    pub records: Vec<VoterRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Ascending order on `field`: codepoint order for text, numeric for years.
pub fn compare(a: &VoterRecord, b: &VoterRecord, field: SortField) -> Ordering {
    match field {
        SortField::Surname => a.surname.cmp(&b.surname),
        SortField::GivenName => a.given_name.cmp(&b.given_name),
        SortField::Patronymic => a.patronymic.cmp(&b.patronymic),
        SortField::BirthYear => a.birth_year.cmp(&b.birth_year),
        SortField::Address => a.address.cmp(&b.address),
        SortField::BirthCity => a.birth_city.cmp(&b.birth_city),
    }
}

/// Sort in place. The sort is stable, so equal keys keep their input order
/// in both directions.
pub fn sort_records(records: &mut [VoterRecord], field: SortField, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => records.sort_by(|a, b| compare(a, b, field)),
        SortDirection::Descending => records.sort_by(|a, b| compare(b, a, field)),
    }
}

/// Load `source` and return its records ordered by `field`.
pub fn sort(
    conn: &Connection,
    source: &SortSource,
    field: SortField,
    direction: SortDirection,
) -> Result<SortOutcome> {
    let mut outcome = match source {
        SortSource::LiveTable => SortOutcome {
            records: query_voters(conn, &Criterion::All)?,
            skipped: Vec::new(),
        },
        SortSource::File(path) => {
            let contents = read_records(path)?;
            SortOutcome {
                records: contents.records,
                skipped: contents.skipped,
            }
        }
    };

    sort_records(&mut outcome.records, field, direction);
    info!(
        ?source,
        field = field.column(),
        direction = direction.label(),
        rows = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "sorted voters"
    );
    Ok(outcome)
}
