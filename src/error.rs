//! Error taxonomy for the domain layer. The terminal front-end wraps these in
//! `anyhow` the same way it wraps everything else, so only the persistence,
//! export and synchronization code deals with the typed variants directly.

use std::io;
use std::path::PathBuf;

use crate::validate::ValidationError;

/// Result alias used by every domain module.
pub type Result<T> = std::result::Result<T, RollError>;

#[derive(thiserror::Error, Debug)]
pub enum RollError {
    /// Raw input rejected by one of the field validators.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No row with the requested identifier.
    #[error("voter with ID {id} not found")]
    NotFound { id: i64 },

    /// The operator asked to work with a store file that is not on disk.
    #[error("database {} does not exist", path.display())]
    MissingStore { path: PathBuf },

    /// SQLite rejected an operation. `context` names the action that failed.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A flat file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RollError {
    pub(crate) fn store(context: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Store { context, source }
    }

    pub(crate) fn file_io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::FileIo { path, source }
    }

    /// Whether the error only concerns operator input and should lead to a
    /// re-prompt instead of abandoning the action.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
