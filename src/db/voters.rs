use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, RollError};
use crate::models::{Criterion, NewVoter, RecordId, VoterRecord};

const SELECT_COLUMNS: &str = "SELECT id, familiya, imya, otchestvo, godrozh, adres, mesto FROM users";

fn voter_from_row(row: &Row<'_>) -> rusqlite::Result<VoterRecord> {
    Ok(VoterRecord {
        id: row.get(0)?,
        surname: row.get(1)?,
        given_name: row.get(2)?,
        patronymic: row.get(3)?,
        birth_year: row.get(4)?,
        address: row.get(5)?,
        birth_city: row.get(6)?,
    })
}

/// Escape LIKE metacharacters so the operator's text matches literally.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Insert one validated voter and return the identifier SQLite assigned.
pub fn insert_voter(conn: &Connection, voter: &NewVoter) -> Result<RecordId> {
    conn.execute(
        "INSERT INTO users (familiya, imya, otchestvo, godrozh, adres, mesto)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            voter.surname,
            voter.given_name,
            voter.patronymic,
            voter.birth_year,
            voter.address,
            voter.birth_city,
        ],
    )
    .map_err(RollError::store("failed to insert voter"))?;

    Ok(conn.last_insert_rowid())
}

/// Look a voter up by id.
pub fn fetch_voter(conn: &Connection, id: RecordId) -> Result<Option<VoterRecord>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        voter_from_row,
    )
    .optional()
    .map_err(RollError::store("failed to look up voter"))
}

/// Remove a voter row. Returns whether a row was actually deleted.
pub fn delete_voter(conn: &Connection, id: RecordId) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM users WHERE id = ?1", params![id])
        .map_err(RollError::store("failed to delete voter"))?;
    Ok(deleted > 0)
}

/// Run `criterion` against the table, rows in id order.
pub fn query_voters(conn: &Connection, criterion: &Criterion) -> Result<Vec<VoterRecord>> {
    let (sql, param): (String, Option<rusqlite::types::Value>) = match criterion {
        Criterion::All => (format!("{SELECT_COLUMNS} ORDER BY id"), None),
        Criterion::ByStreetSubstring(street) => (
            format!("{SELECT_COLUMNS} WHERE adres LIKE ?1 ESCAPE '\\' ORDER BY id"),
            Some(like_pattern(street).into()),
        ),
        Criterion::ByBirthYear(year) => (
            format!("{SELECT_COLUMNS} WHERE godrozh = ?1 ORDER BY id"),
            Some(i64::from(*year).into()),
        ),
        Criterion::ByBirthCity(city) => (
            format!("{SELECT_COLUMNS} WHERE mesto = ?1 ORDER BY id"),
            Some(city.clone().into()),
        ),
    };

    let mut stmt = conn
        .prepare(&sql)
        .map_err(RollError::store("failed to prepare voter query"))?;

    let rows = match param {
        Some(value) => stmt.query_map([value], voter_from_row),
        None => stmt.query_map([], voter_from_row),
    }
    .map_err(RollError::store("failed to run voter query"))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(RollError::store("failed to collect voters"))
}

pub fn count_voters(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(RollError::store("failed to count voters"))
}
