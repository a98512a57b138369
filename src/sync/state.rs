use crate::models::{Criterion, CriterionKind};

/// What the operator last searched for during this store session, and which
/// file each search's results were last saved to.
///
/// The value lives inside the session and is dropped with it; nothing here is
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastSearch {
    year: Option<i32>,
    street: String,
    city: String,
    year_file: String,
    street_file: String,
    city_file: String,
}

impl LastSearch {
    /// Remember a filtered search that returned at least one row. `All` is
    /// ignored.
    pub fn record(&mut self, criterion: &Criterion) {
        match criterion {
            Criterion::All => {}
            Criterion::ByStreetSubstring(street) => self.street = street.clone(),
            Criterion::ByBirthYear(year) => self.year = Some(*year),
            Criterion::ByBirthCity(city) => self.city = city.clone(),
        }
    }

    /// Remember the file a search's results were saved under.
    pub fn remember_file(&mut self, kind: CriterionKind, file_name: &str) {
        let slot = match kind {
            CriterionKind::Year => &mut self.year_file,
            CriterionKind::Street => &mut self.street_file,
            CriterionKind::City => &mut self.city_file,
        };
        *slot = file_name.to_string();
    }

    /// File that holds `kind`'s cached results: the remembered name, or the
    /// default one.
    pub fn file_for(&self, kind: CriterionKind) -> &str {
        let remembered = match kind {
            CriterionKind::Year => &self.year_file,
            CriterionKind::Street => &self.street_file,
            CriterionKind::City => &self.city_file,
        };
        if remembered.is_empty() {
            kind.default_file_name()
        } else {
            remembered.as_str()
        }
    }

    /// The tracked criterion for `kind`, when one is set.
    pub fn criterion(&self, kind: CriterionKind) -> Option<Criterion> {
        match kind {
            CriterionKind::Year => self.year.map(Criterion::ByBirthYear),
            CriterionKind::Street => (!self.street.is_empty())
                .then(|| Criterion::ByStreetSubstring(self.street.clone())),
            CriterionKind::City => {
                (!self.city.is_empty()).then(|| Criterion::ByBirthCity(self.city.clone()))
            }
        }
    }

    /// No search criterion has been set yet this session.
    pub fn is_unset(&self) -> bool {
        CriterionKind::ALL
            .iter()
            .all(|kind| self.criterion(*kind).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_with_default_files() {
        let state = LastSearch::default();
        assert!(state.is_unset());
        assert_eq!(state.file_for(CriterionKind::Year), "year_sort.txt");
        assert_eq!(state.file_for(CriterionKind::Street), "adres_sort.txt");
        assert_eq!(state.file_for(CriterionKind::City), "city_sort.txt");
    }

    #[test]
    fn records_criteria_and_files_independently() {
        let mut state = LastSearch::default();
        state.record(&Criterion::All);
        assert!(state.is_unset());

        state.record(&Criterion::ByBirthCity("Казань".into()));
        state.remember_file(CriterionKind::City, "kazan.txt");
        assert!(!state.is_unset());
        assert_eq!(
            state.criterion(CriterionKind::City),
            Some(Criterion::ByBirthCity("Казань".into()))
        );
        assert_eq!(state.criterion(CriterionKind::Year), None);
        assert_eq!(state.file_for(CriterionKind::City), "kazan.txt");
        assert_eq!(state.file_for(CriterionKind::Year), "year_sort.txt");

        state.record(&Criterion::ByBirthYear(1990));
        assert_eq!(
            state.criterion(CriterionKind::Year),
            Some(Criterion::ByBirthYear(1990))
        );
    }
}
