//! Keeps the derived flat files in step with the `users` table: insert
//! propagation driven by the last search, and pruning on delete.

mod delete;
mod insert;
mod state;

pub use delete::{delete_by_id, dependent_files, DeleteOutcome};
pub use insert::{on_insert, InsertMode, SyncReport};
pub use state::LastSearch;
