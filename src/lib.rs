//! Voter roll: a single-user terminal application over one SQLite `users`
//! table, with derived flat-file exports kept consistent on insert and
//! delete.
//!
//! The domain modules (`builder`, `db`, `export`, `sort`, `sync`, `session`)
//! carry no terminal code, so the `bin` target and the integration tests share
//! the same pieces.
use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod sort;
pub mod sync;
pub mod ui;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use builder::{build, build_and_insert, Inserted, RawVoter};
pub use config::Config;
pub use error::{Result as RollResult, RollError};
pub use models::{Criterion, CriterionKind, Script, SortDirection, SortField, VoterRecord};
pub use session::{SaveTarget, SavedFile, Session};
pub use sort::{SortOutcome, SortSource};
pub use sync::{DeleteOutcome, InsertMode, LastSearch};
pub use validate::{validate, Constraint, ValidationError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

/// Route `tracing` output to the workspace log file. The terminal belongs to
/// the TUI, so nothing is written to stdout or stderr.
pub fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voter_roll=info"));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
