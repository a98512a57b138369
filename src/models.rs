//! Domain models that mirror the `users` table and the knobs the query, sort
//! and export layers are driven by. These stay light-weight data holders so
//! the other layers can focus on persistence and file bookkeeping.

use std::fmt;

/// Identifier assigned by the store.
pub type RecordId = i64;

/// One voter row. The same struct is produced from the live table and from
/// parsed flat-file lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterRecord {
    /// Primary key; `AUTOINCREMENT` guarantees ids are never reused.
    pub id: RecordId,
    pub surname: String,
    pub given_name: String,
    pub patronymic: String,
    pub birth_year: i32,
    /// Composed address, e.g. `Ул. Ленина, д. 10, кв. 5`.
    pub address: String,
    pub birth_city: String,
}

impl VoterRecord {
    /// Whether the record falls into the result set of `criterion`.
    pub fn matches(&self, criterion: &Criterion) -> bool {
        match criterion {
            Criterion::All => true,
            Criterion::ByStreetSubstring(street) => self.address.contains(street.as_str()),
            Criterion::ByBirthYear(year) => self.birth_year == *year,
            Criterion::ByBirthCity(city) => self.birth_city == *city,
        }
    }
}

impl fmt::Display for VoterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.surname, self.given_name, self.patronymic
        )
    }
}

/// Validated field values waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoter {
    pub surname: String,
    pub given_name: String,
    pub patronymic: String,
    pub birth_year: i32,
    pub address: String,
    pub birth_city: String,
}

impl NewVoter {
    /// Attach the identifier the store assigned.
    pub fn with_id(self, id: RecordId) -> VoterRecord {
        VoterRecord {
            id,
            surname: self.surname,
            given_name: self.given_name,
            patronymic: self.patronymic,
            birth_year: self.birth_year,
            address: self.address,
            birth_city: self.birth_city,
        }
    }
}

/// Letter class accepted in names and cities. It also picks the address
/// template and the column labels written to flat files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Script {
    #[default]
    Cyrillic,
    Latin,
}

impl Script {
    /// Parse the configuration spelling (`cyrillic` / `latin`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cyrillic" => Some(Self::Cyrillic),
            "latin" => Some(Self::Latin),
            _ => None,
        }
    }

    /// Any letter of the script, either case.
    pub fn is_letter(self, ch: char) -> bool {
        match self {
            Script::Cyrillic => ('А'..='я').contains(&ch) || ch == 'Ё' || ch == 'ё',
            Script::Latin => ch.is_ascii_alphabetic(),
        }
    }

    /// Capital letters only.
    pub fn is_capital(self, ch: char) -> bool {
        match self {
            Script::Cyrillic => ('А'..='Я').contains(&ch) || ch == 'Ё',
            Script::Latin => ch.is_ascii_uppercase(),
        }
    }

    /// Compose the stored address string from its three tokens.
    pub fn compose_address(self, street: &str, house: u32, apartment: u32) -> String {
        match self {
            Script::Cyrillic => format!("Ул. {street}, д. {house}, кв. {apartment}"),
            Script::Latin => format!("Ul. {street}, d. {house}, kv. {apartment}"),
        }
    }

    /// Column labels for the flat-file header, in table order after `ID`.
    pub fn column_labels(self) -> [&'static str; 6] {
        match self {
            Script::Cyrillic => [
                "Фамилия",
                "Имя",
                "Отчество",
                "Год рождения",
                "Адрес",
                "Место",
            ],
            Script::Latin => [
                "Surname",
                "Given name",
                "Patronymic",
                "Birth year",
                "Address",
                "City",
            ],
        }
    }
}

/// Selection applied by the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    All,
    ByStreetSubstring(String),
    ByBirthYear(i32),
    ByBirthCity(String),
}

impl Criterion {
    /// The tracked search this criterion feeds, `None` for `All`.
    pub fn kind(&self) -> Option<CriterionKind> {
        match self {
            Criterion::All => None,
            Criterion::ByStreetSubstring(_) => Some(CriterionKind::Street),
            Criterion::ByBirthYear(_) => Some(CriterionKind::Year),
            Criterion::ByBirthCity(_) => Some(CriterionKind::City),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Criterion::All => "all voters".to_string(),
            Criterion::ByStreetSubstring(street) => format!("street containing '{street}'"),
            Criterion::ByBirthYear(year) => format!("birth year {year}"),
            Criterion::ByBirthCity(city) => format!("birth city {city}"),
        }
    }
}

/// The three searches whose results are cached in flat files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    Year,
    Street,
    City,
}

impl CriterionKind {
    pub const ALL: [CriterionKind; 3] =
        [CriterionKind::Year, CriterionKind::Street, CriterionKind::City];

    /// File that receives the results when the operator never picked a name.
    pub fn default_file_name(self) -> &'static str {
        match self {
            CriterionKind::Year => "year_sort.txt",
            CriterionKind::Street => "adres_sort.txt",
            CriterionKind::City => "city_sort.txt",
        }
    }
}

/// Column a sort runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Surname,
    GivenName,
    Patronymic,
    BirthYear,
    Address,
    BirthCity,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Surname,
        SortField::GivenName,
        SortField::Patronymic,
        SortField::BirthYear,
        SortField::Address,
        SortField::BirthCity,
    ];

    /// Name of the backing column in `users`.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Surname => "familiya",
            SortField::GivenName => "imya",
            SortField::Patronymic => "otchestvo",
            SortField::BirthYear => "godrozh",
            SortField::Address => "adres",
            SortField::BirthCity => "mesto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Surname => "Surname",
            SortField::GivenName => "Given name",
            SortField::Patronymic => "Patronymic",
            SortField::BirthYear => "Birth year",
            SortField::Address => "Address",
            SortField::BirthCity => "Birth city",
        }
    }

    /// Full-table sort cache for this field, e.g. `sorted_godrozh.txt`.
    pub fn cache_file_name(self) -> String {
        format!("sorted_{}.txt", self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}
