use std::path::Path;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{delete_voter, fetch_voter};
use crate::error::Result;
use crate::export::{prune_record, PruneOutcome};
use crate::models::{CriterionKind, RecordId, SortField, VoterRecord};

use super::state::LastSearch;

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        record: VoterRecord,
        /// Every dependent file that existed, with what was pruned from it.
        pruned: Vec<(String, PruneOutcome)>,
        /// Files that could not be rewritten, with the error message.
        failed: Vec<(String, String)>,
    },
    NotFound,
}

/// Flat files derived from the table: the three criterion caches (as
/// currently resolved) followed by the six full-table sort caches.
pub fn dependent_files(last_search: &LastSearch) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    let candidates = CriterionKind::ALL
        .iter()
        .map(|kind| last_search.file_for(*kind).to_string())
        .chain(SortField::ALL.iter().map(|field| field.cache_file_name()));
    for name in candidates {
        if !files.contains(&name) {
            files.push(name);
        }
    }
    files
}

/// Delete the voter with `id` and remove its line from every dependent file.
///
/// The row is looked up first; when it does not exist nothing is deleted and
/// no file is touched.
pub fn delete_by_id(
    conn: &Connection,
    dir: &Path,
    last_search: &LastSearch,
    id: RecordId,
) -> Result<DeleteOutcome> {
    let Some(record) = fetch_voter(conn, id)? else {
        info!(id, "delete requested for unknown voter");
        return Ok(DeleteOutcome::NotFound);
    };

    if !delete_voter(conn, id)? {
        return Ok(DeleteOutcome::NotFound);
    }
    info!(id, voter = %record, "deleted voter");

    let mut pruned = Vec::new();
    let mut failed = Vec::new();
    for file_name in dependent_files(last_search) {
        match prune_record(&dir.join(&file_name), id) {
            Ok(Some(outcome)) => {
                if outcome.retained_malformed > 0 {
                    warn!(
                        file = %file_name,
                        lines = outcome.retained_malformed,
                        "kept lines with unparsable IDs"
                    );
                }
                pruned.push((file_name, outcome));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(file = %file_name, error = %err, "failed to prune cache file");
                failed.push((file_name, err.to_string()));
            }
        }
    }

    Ok(DeleteOutcome::Deleted {
        record,
        pruned,
        failed,
    })
}
