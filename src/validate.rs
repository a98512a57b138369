//! Line-oriented validators for operator input. Each rule is a pure function
//! of the candidate string and the active script; the record builder and the
//! terminal prompts share them so a value accepted by a prompt is always
//! accepted by the store path too.

use crate::models::Script;

/// Birth years accepted for new entries.
pub const ENTRY_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1930..=2007;
/// Birth years accepted as a search bound.
pub const SEARCH_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2025;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must contain only letters and start with a capital letter")]
    Name { field: &'static str },

    #[error("{field} must contain only letters or an inner hyphen and start with a capital letter")]
    Surname { field: &'static str },

    #[error("{field} must contain only letters")]
    Letters { field: &'static str },

    #[error("{field} may only contain letters, digits, underscores or dots")]
    Filename { field: &'static str },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },

    #[error("{field} must be a four-digit year from {min} to {max}")]
    YearOutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
    },

    #[error("address must be: street, house number and apartment number separated by spaces (e.g. Lenina 64 5)")]
    AddressFormat,

    #[error("street name must start with a capital letter")]
    StreetCapital,

    #[error("street name must not contain '|'")]
    StreetDelimiter,
}

/// Named rule a candidate string is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Letters of the script with inner hyphens, capital initial.
    Surname,
    /// Letters and spaces, capital initial.
    Name,
    /// Letters and spaces, any case.
    Letters,
    /// ASCII letters, digits, `_`, `.` and letters of the script.
    Filename,
    /// Non-empty, digits only.
    Digits,
    /// Digits only, strictly positive.
    PositiveId,
    /// Integer inside [`ENTRY_YEAR_RANGE`].
    EntryYear,
    /// Four digits inside [`SEARCH_YEAR_RANGE`].
    SearchYear,
    /// Anything but the empty string.
    NonEmpty,
}

impl Constraint {
    /// Check `candidate`, naming `field` in the error on rejection.
    pub fn check(
        self,
        field: &'static str,
        candidate: &str,
        script: Script,
    ) -> Result<(), ValidationError> {
        if candidate.is_empty() {
            return Err(ValidationError::EmptyField { field });
        }
        let accepted = match self {
            Constraint::Surname => is_surname(candidate, script),
            Constraint::Name => {
                is_letters_and_spaces(candidate, script) && starts_with_capital(candidate, script)
            }
            Constraint::Letters => is_letters_and_spaces(candidate, script),
            Constraint::Filename => is_filename(candidate, script),
            Constraint::Digits => is_digits(candidate),
            Constraint::PositiveId => {
                if !is_digits(candidate) {
                    return Err(ValidationError::NotANumber { field });
                }
                candidate.parse::<i64>().map(|id| id > 0).unwrap_or(false)
            }
            Constraint::EntryYear => {
                let year = candidate
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| ValidationError::NotANumber { field })?;
                ENTRY_YEAR_RANGE.contains(&year)
            }
            Constraint::SearchYear => {
                candidate.len() == 4
                    && is_digits(candidate)
                    && candidate
                        .parse::<i32>()
                        .map(|year| SEARCH_YEAR_RANGE.contains(&year))
                        .unwrap_or(false)
            }
            Constraint::NonEmpty => true,
        };

        if accepted {
            Ok(())
        } else {
            Err(self.rejection(field))
        }
    }

    fn rejection(self, field: &'static str) -> ValidationError {
        match self {
            Constraint::Surname => ValidationError::Surname { field },
            Constraint::Name => ValidationError::Name { field },
            Constraint::Letters => ValidationError::Letters { field },
            Constraint::Filename => ValidationError::Filename { field },
            Constraint::Digits => ValidationError::NotANumber { field },
            Constraint::PositiveId => ValidationError::NotPositive { field },
            Constraint::EntryYear => ValidationError::YearOutOfRange {
                field,
                min: *ENTRY_YEAR_RANGE.start(),
                max: *ENTRY_YEAR_RANGE.end(),
            },
            Constraint::SearchYear => ValidationError::YearOutOfRange {
                field,
                min: *SEARCH_YEAR_RANGE.start(),
                max: *SEARCH_YEAR_RANGE.end(),
            },
            Constraint::NonEmpty => ValidationError::EmptyField { field },
        }
    }
}

/// Accept/reject form of [`Constraint::check`].
pub fn validate(candidate: &str, constraint: Constraint, script: Script) -> bool {
    constraint.check("value", candidate, script).is_ok()
}

/// First character is a capital letter of the script.
pub fn starts_with_capital(candidate: &str, script: Script) -> bool {
    candidate
        .chars()
        .next()
        .is_some_and(|ch| script.is_capital(ch))
}

fn is_letters_and_spaces(candidate: &str, script: Script) -> bool {
    candidate.chars().any(|ch| script.is_letter(ch))
        && candidate
            .chars()
            .all(|ch| ch == ' ' || script.is_letter(ch))
}

fn is_surname(candidate: &str, script: Script) -> bool {
    if candidate.starts_with('-') || candidate.ends_with('-') {
        return false;
    }
    starts_with_capital(candidate, script)
        && candidate
            .chars()
            .all(|ch| ch == '-' || script.is_letter(ch))
}

fn is_filename(candidate: &str, script: Script) -> bool {
    candidate
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || script.is_letter(ch))
}

fn is_digits(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CY: Script = Script::Cyrillic;

    #[test]
    fn surnames_allow_inner_hyphens_only() {
        assert!(validate("Петров", Constraint::Surname, CY));
        assert!(validate("Римский-Корсаков", Constraint::Surname, CY));
        assert!(validate("Ёлкин", Constraint::Surname, CY));
        assert!(!validate("-Петров", Constraint::Surname, CY));
        assert!(!validate("Петров-", Constraint::Surname, CY));
        assert!(!validate("петров", Constraint::Surname, CY));
        assert!(!validate("Петров Иван", Constraint::Surname, CY));
        assert!(!validate("Petrov", Constraint::Surname, CY));
        assert!(validate("Petrov", Constraint::Surname, Script::Latin));
    }

    #[test]
    fn names_and_cities_allow_spaces() {
        assert!(validate("Нижний Новгород", Constraint::Name, CY));
        assert!(!validate("нижний Новгород", Constraint::Name, CY));
        assert!(!validate("Иван1", Constraint::Name, CY));
        assert!(validate("казань", Constraint::Letters, CY));
        assert!(!validate("   ", Constraint::Letters, CY));
        assert!(!validate("", Constraint::Letters, CY));
    }

    #[test]
    fn filenames_reject_path_separators() {
        assert!(validate("list_voiters1", Constraint::Filename, CY));
        assert!(validate("отчёт.2024", Constraint::Filename, CY));
        assert!(!validate("../etc", Constraint::Filename, CY));
        assert!(!validate("my file", Constraint::Filename, CY));
    }

    #[test]
    fn year_ranges_differ_between_entry_and_search() {
        assert!(validate("1930", Constraint::EntryYear, CY));
        assert!(validate("2007", Constraint::EntryYear, CY));
        assert!(!validate("1929", Constraint::EntryYear, CY));
        assert!(!validate("2008", Constraint::EntryYear, CY));
        assert!(validate("1900", Constraint::SearchYear, CY));
        assert!(validate("2025", Constraint::SearchYear, CY));
        assert!(!validate("2026", Constraint::SearchYear, CY));
        assert!(!validate("990", Constraint::SearchYear, CY));
    }

    #[test]
    fn ids_must_be_positive_digits() {
        assert!(validate("12", Constraint::PositiveId, CY));
        assert!(!validate("0", Constraint::PositiveId, CY));
        assert_eq!(
            Constraint::PositiveId.check("ID", "-3", CY),
            Err(ValidationError::NotANumber { field: "ID" })
        );
    }

    #[test]
    fn errors_name_the_field() {
        let err = Constraint::EntryYear
            .check("birth year", "1800", CY)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "birth year must be a four-digit year from 1930 to 2007"
        );
    }
}
