//! Persistence module split across logical submodules.

mod connection;
mod voters;

pub use connection::{ensure_schema, open_store, store_path, STORE_EXTENSION};
pub use voters::{count_voters, delete_voter, fetch_voter, insert_voter, query_voters};
