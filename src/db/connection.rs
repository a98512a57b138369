use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, RollError};

/// Extension appended to the operator-supplied store name.
pub const STORE_EXTENSION: &str = "db";

/// Resolve `<dir>/<name>.db`. The name is expected to have passed the
/// filename validator already.
pub fn store_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{STORE_EXTENSION}"))
}

/// Open the store at `path` and make sure the `users` table exists.
///
/// With `create == false` a missing file is reported as
/// [`RollError::MissingStore`] instead of silently creating an empty store,
/// which is what SQLite would otherwise do on open.
pub fn open_store(path: &Path, create: bool) -> Result<Connection> {
    if !create && !path.exists() {
        return Err(RollError::MissingStore {
            path: path.to_path_buf(),
        });
    }

    let conn = Connection::open(path).map_err(RollError::store("failed to open SQLite database"))?;
    // Street search is a LIKE match; keep it case-sensitive for every script.
    conn.execute_batch("PRAGMA case_sensitive_like = ON")
        .map_err(RollError::store("failed to enable case-sensitive LIKE"))?;
    ensure_schema(&conn)?;

    info!(store = %path.display(), create, "opened voter store");
    Ok(conn)
}

/// Lazily create the single `users` table. Safe to run on every open.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            familiya TEXT NOT NULL,
            imya TEXT NOT NULL,
            otchestvo TEXT NOT NULL,
            godrozh INTEGER NOT NULL,
            adres TEXT NOT NULL,
            mesto TEXT NOT NULL
        )",
        [],
    )
    .map_err(RollError::store("failed to create users table"))?;
    debug!("users table ready");
    Ok(())
}
