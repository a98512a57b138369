//! Record builder: turns raw operator input into a validated voter, inserts
//! it and hands the stored record to the export synchronizer.

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::db::insert_voter;
use crate::error::Result;
use crate::models::{NewVoter, Script, VoterRecord};
use crate::sync::{on_insert, InsertMode, LastSearch, SyncReport};
use crate::validate::{starts_with_capital, Constraint, ValidationError};

/// Field values exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawVoter {
    pub surname: String,
    pub given_name: String,
    pub patronymic: String,
    pub birth_year: String,
    /// `<street> <house> <apartment>`, e.g. `Ленина 64 5`.
    pub address: String,
    pub birth_city: String,
}

/// A stored record and the cache files it was propagated to.
#[derive(Debug, Clone)]
pub struct Inserted {
    pub record: VoterRecord,
    pub sync: SyncReport,
}

/// Split `<street> <house> <apartment>` and compose the stored address.
///
/// Exactly three tokens are required and both numbers must be positive
/// integers. The street starts with a capital letter of the script and may
/// not contain the flat-file column delimiter.
pub fn compose_address(raw: &str, script: Script) -> std::result::Result<String, ValidationError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let &[street, house, apartment] = tokens.as_slice() else {
        return Err(ValidationError::AddressFormat);
    };
    if !starts_with_capital(street, script) {
        return Err(ValidationError::StreetCapital);
    }
    if street.contains('|') {
        return Err(ValidationError::StreetDelimiter);
    }
    let number = |token: &str| token.parse::<u32>().ok().filter(|value| *value > 0);
    match (number(house), number(apartment)) {
        (Some(house), Some(apartment)) => Ok(script.compose_address(street, house, apartment)),
        _ => Err(ValidationError::AddressFormat),
    }
}

/// Validate every field of `raw` without touching the store.
pub fn build(raw: &RawVoter, script: Script) -> std::result::Result<NewVoter, ValidationError> {
    let surname = raw.surname.trim();
    let given_name = raw.given_name.trim();
    let patronymic = raw.patronymic.trim();
    let birth_year = raw.birth_year.trim();
    let birth_city = raw.birth_city.trim();

    Constraint::Surname.check("surname", surname, script)?;
    Constraint::Name.check("given name", given_name, script)?;
    Constraint::Name.check("patronymic", patronymic, script)?;
    Constraint::EntryYear.check("birth year", birth_year, script)?;
    let address = compose_address(&raw.address, script)?;
    Constraint::Name.check("birth city", birth_city, script)?;

    Ok(NewVoter {
        surname: surname.to_string(),
        given_name: given_name.to_string(),
        patronymic: patronymic.to_string(),
        birth_year: birth_year
            .parse()
            .map_err(|_| ValidationError::NotANumber { field: "birth year" })?,
        address,
        birth_city: birth_city.to_string(),
    })
}

/// Validate, insert and propagate one voter.
///
/// Validation failures surface as [`crate::RollError::Validation`] before any
/// store mutation.
pub fn build_and_insert(
    conn: &Connection,
    dir: &Path,
    script: Script,
    last_search: &LastSearch,
    mode: InsertMode,
    raw: &RawVoter,
) -> Result<Inserted> {
    let voter = build(raw, script)?;
    let id = insert_voter(conn, &voter)?;
    let record = voter.with_id(id);
    info!(id, voter = %record, "inserted voter");

    let sync = on_insert(conn, dir, script, last_search, mode, &record);
    Ok(Inserted { record, sync })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawVoter {
        RawVoter {
            surname: "Петров".into(),
            given_name: "Иван".into(),
            patronymic: "Иванович".into(),
            birth_year: "1990".into(),
            address: "Ленина 10 5".into(),
            birth_city: "Казань".into(),
        }
    }

    #[test]
    fn builds_a_voter_with_composed_address() {
        let voter = build(&raw(), Script::Cyrillic).unwrap();
        assert_eq!(voter.address, "Ул. Ленина, д. 10, кв. 5");
        assert_eq!(voter.birth_year, 1990);
    }

    #[test]
    fn address_needs_three_tokens_and_positive_numbers() {
        let cy = Script::Cyrillic;
        assert_eq!(
            compose_address("  Ленина   64  5 ", cy),
            Ok("Ул. Ленина, д. 64, кв. 5".to_string())
        );
        assert_eq!(compose_address("Ленина 64", cy), Err(ValidationError::AddressFormat));
        assert_eq!(compose_address("Ленина 64 5 7", cy), Err(ValidationError::AddressFormat));
        assert_eq!(compose_address("Ленина 0 5", cy), Err(ValidationError::AddressFormat));
        assert_eq!(compose_address("Ленина 6а 5", cy), Err(ValidationError::AddressFormat));
        assert_eq!(compose_address("Ленина -1 5", cy), Err(ValidationError::AddressFormat));
        assert_eq!(compose_address("ленина 64 5", cy), Err(ValidationError::StreetCapital));
    }

    #[test]
    fn street_cannot_carry_the_column_delimiter() {
        assert_eq!(
            compose_address("Ле|нина 10 5", Script::Cyrillic),
            Err(ValidationError::StreetDelimiter)
        );
        let mut bad = raw();
        bad.address = "Ленина| 10 5".into();
        assert_eq!(
            build(&bad, Script::Cyrillic),
            Err(ValidationError::StreetDelimiter)
        );
    }

    #[test]
    fn rejects_each_bad_field() {
        let mut bad = raw();
        bad.surname = "петров".into();
        assert_eq!(
            build(&bad, Script::Cyrillic),
            Err(ValidationError::Surname { field: "surname" })
        );

        let mut bad = raw();
        bad.birth_year = "2010".into();
        assert!(matches!(
            build(&bad, Script::Cyrillic),
            Err(ValidationError::YearOutOfRange { .. })
        ));

        let mut bad = raw();
        bad.birth_city = String::new();
        assert_eq!(
            build(&bad, Script::Cyrillic),
            Err(ValidationError::EmptyField { field: "birth city" })
        );
    }

    #[test]
    fn latin_script_uses_latin_template() {
        let raw = RawVoter {
            surname: "Petrov".into(),
            given_name: "Ivan".into(),
            patronymic: "Ivanovich".into(),
            birth_year: "1990".into(),
            address: "Lenina 10 5".into(),
            birth_city: "Kazan".into(),
        };
        let voter = build(&raw, Script::Latin).unwrap();
        assert_eq!(voter.address, "Ul. Lenina, d. 10, kv. 5");
        assert!(build(&raw, Script::Cyrillic).is_err());
    }
}
