use std::path::Path;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::query_voters;
use crate::export::{append_records, record_ids};
use crate::models::{Criterion, CriterionKind, Script, SortField, VoterRecord};

use super::state::LastSearch;

/// How records are being entered in the current store session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// First fill of a freshly created store.
    Create,
    /// Adding to an existing store; seeds the criterion caches when no
    /// search has been run yet.
    Append,
}

/// Files touched while propagating one insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub appended: Vec<String>,
    /// File name and error message for every cache that could not be
    /// updated. The insert itself is not rolled back.
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    fn append(&mut self, dir: &Path, script: Script, file_name: &str, records: &[VoterRecord]) {
        match append_records(&dir.join(file_name), script, records) {
            Ok(()) => {
                if !self.appended.iter().any(|name| name == file_name) {
                    self.appended.push(file_name.to_string());
                }
            }
            Err(err) => {
                warn!(file = file_name, error = %err, "failed to update cache file");
                self.failed.push((file_name.to_string(), err.to_string()));
            }
        }
    }
}

/// Propagate a freshly inserted record into every flat file that must keep
/// tracking it:
///
/// * each criterion cache whose remembered search the record satisfies;
/// * each `sorted_<column>.txt` cache that already exists, unconditionally
///   and at the end of the file (the file's sort order is not restored);
/// * in [`InsertMode::Append`] with no search remembered, the three default
///   criterion caches, seeded from fresh queries on the record's own address,
///   year and city.
///
/// The row is already committed when this runs, so every failure lands in
/// [`SyncReport::failed`] instead of being returned.
pub fn on_insert(
    conn: &Connection,
    dir: &Path,
    script: Script,
    last_search: &LastSearch,
    mode: InsertMode,
    record: &VoterRecord,
) -> SyncReport {
    let mut report = SyncReport::default();
    let row = std::slice::from_ref(record);

    for kind in CriterionKind::ALL {
        if let Some(criterion) = last_search.criterion(kind) {
            if record.matches(&criterion) {
                report.append(dir, script, last_search.file_for(kind), row);
            }
        }
    }

    for field in SortField::ALL {
        let file_name = field.cache_file_name();
        if dir.join(&file_name).exists() && !report.appended.contains(&file_name) {
            report.append(dir, script, &file_name, row);
        }
    }

    if mode == InsertMode::Append && last_search.is_unset() {
        seed_default_caches(conn, dir, script, record, &mut report);
    }

    info!(id = record.id, files = ?report.appended, "propagated insert to cache files");
    report
}

fn seed_default_caches(
    conn: &Connection,
    dir: &Path,
    script: Script,
    record: &VoterRecord,
    report: &mut SyncReport,
) {
    let seeds = [
        (
            CriterionKind::Street,
            Criterion::ByStreetSubstring(record.address.clone()),
        ),
        (CriterionKind::Year, Criterion::ByBirthYear(record.birth_year)),
        (
            CriterionKind::City,
            Criterion::ByBirthCity(record.birth_city.clone()),
        ),
    ];

    for (kind, criterion) in seeds {
        let file_name = kind.default_file_name();
        let present = match record_ids(&dir.join(file_name)) {
            Ok(ids) => ids,
            Err(err) => {
                warn!(file = file_name, error = %err, "failed to read cache file");
                report.failed.push((file_name.to_string(), err.to_string()));
                continue;
            }
        };
        let matching = match query_voters(conn, &criterion) {
            Ok(matching) => matching,
            Err(err) => {
                warn!(file = file_name, error = %err, "failed to query seed rows");
                report.failed.push((file_name.to_string(), err.to_string()));
                continue;
            }
        };
        let missing: Vec<VoterRecord> = matching
            .into_iter()
            .filter(|voter| !present.contains(&voter.id))
            .collect();
        if !missing.is_empty() {
            report.append(dir, script, file_name, &missing);
        }
    }
}
