//! A "work with this store" session: the open connection, the workspace the
//! flat files live in and the last-search state. Every operation the terminal
//! front-end offers inside a store goes through here.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use crate::builder::{build_and_insert, Inserted, RawVoter};
use crate::config::Config;
use crate::db::{count_voters, open_store, query_voters, store_path};
use crate::error::Result;
use crate::export::{flat_file_name, read_records, write_records, FileContents};
use crate::models::{Criterion, RecordId, Script, SortDirection, SortField, VoterRecord};
use crate::sort::{sort, SortOutcome, SortSource};
use crate::sync::{delete_by_id, DeleteOutcome, InsertMode, LastSearch};
use crate::validate::Constraint;

/// File name chosen when saving results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// The context's default file (`year_sort.txt`, `sorted_imya.txt`, ...).
    Default,
    /// Operator-supplied name without extension; `.txt` is appended.
    Custom(String),
}

/// Where results were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub rows: usize,
}

pub struct Session {
    conn: Connection,
    store_path: PathBuf,
    dir: PathBuf,
    script: Script,
    mode: InsertMode,
    last_search: LastSearch,
}

impl Session {
    /// Open `<workspace>/<store_name>.db`. With `create` the store is created
    /// and the session starts in [`InsertMode::Create`]; otherwise the file
    /// must already exist and inserts run in [`InsertMode::Append`].
    pub fn open(config: &Config, store_name: &str, create: bool) -> Result<Self> {
        Constraint::Filename.check("database name", store_name, config.script)?;
        let path = store_path(&config.workspace_dir, store_name);
        let conn = open_store(&path, create)?;
        Ok(Self {
            conn,
            store_path: path,
            dir: config.workspace_dir.clone(),
            script: config.script,
            mode: if create {
                InsertMode::Create
            } else {
                InsertMode::Append
            },
            last_search: LastSearch::default(),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn store_name(&self) -> String {
        self.store_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn mode(&self) -> InsertMode {
        self.mode
    }

    /// Switch insert mode, e.g. once the initial fill of a new store ends.
    pub fn set_mode(&mut self, mode: InsertMode) {
        self.mode = mode;
    }

    pub fn last_search(&self) -> &LastSearch {
        &self.last_search
    }

    /// Absolute path of a flat file inside the workspace.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn count(&self) -> Result<i64> {
        count_voters(&self.conn)
    }

    pub fn list_all(&self) -> Result<Vec<VoterRecord>> {
        query_voters(&self.conn, &Criterion::All)
    }

    /// Run a filtered query. A non-empty result becomes the remembered
    /// search for its criterion; an empty one leaves the state alone.
    pub fn search(&mut self, criterion: &Criterion) -> Result<Vec<VoterRecord>> {
        let records = query_voters(&self.conn, criterion)?;
        if records.is_empty() {
            info!(criterion = %criterion.describe(), "no matching voters");
        } else {
            self.last_search.record(criterion);
            info!(criterion = %criterion.describe(), rows = records.len(), "search matched voters");
        }
        Ok(records)
    }

    /// Re-run `criterion` and overwrite the chosen file with its results.
    /// The file becomes the remembered target for the criterion.
    pub fn save_search_results(
        &mut self,
        criterion: &Criterion,
        target: &SaveTarget,
    ) -> Result<SavedFile> {
        let default = criterion
            .kind()
            .map(|kind| kind.default_file_name().to_string())
            .unwrap_or_else(|| "all_users.txt".to_string());
        let file_name = self.resolve_target(target, &default)?;
        let records = query_voters(&self.conn, criterion)?;
        let saved = self.write_file(&file_name, &records)?;
        if let Some(kind) = criterion.kind() {
            self.last_search.remember_file(kind, &file_name);
        }
        Ok(saved)
    }

    /// Validate and insert one voter, then update dependent flat files.
    pub fn insert(&mut self, raw: &RawVoter) -> Result<Inserted> {
        build_and_insert(
            &self.conn,
            &self.dir,
            self.script,
            &self.last_search,
            self.mode,
            raw,
        )
    }

    /// Delete by id and prune the record from every dependent flat file.
    pub fn delete(&mut self, id: RecordId) -> Result<DeleteOutcome> {
        delete_by_id(&self.conn, &self.dir, &self.last_search, id)
    }

    /// Sort source for the flat file `<name>.txt` in the workspace.
    pub fn file_source(&self, name: &str) -> Result<SortSource> {
        Constraint::Filename.check("file name", name, self.script)?;
        Ok(SortSource::File(self.file_path(&flat_file_name(name))))
    }

    pub fn sort(
        &self,
        source: &SortSource,
        field: SortField,
        direction: SortDirection,
    ) -> Result<SortOutcome> {
        sort(&self.conn, source, field, direction)
    }

    /// Persist sorted records. For a live-table sort the default target is
    /// the field's `sorted_<column>.txt` cache.
    pub fn save_sorted(
        &self,
        field: SortField,
        target: &SaveTarget,
        records: &[VoterRecord],
    ) -> Result<SavedFile> {
        let file_name = self.resolve_target(target, &field.cache_file_name())?;
        self.write_file(&file_name, records)
    }

    /// Parse `<name>.txt` for display.
    pub fn read_flat_file(&self, name: &str) -> Result<(String, FileContents)> {
        Constraint::Filename.check("file name", name, self.script)?;
        let file_name = flat_file_name(name);
        let contents = read_records(&self.file_path(&file_name))?;
        Ok((file_name, contents))
    }

    fn resolve_target(&self, target: &SaveTarget, default: &str) -> Result<String> {
        match target {
            SaveTarget::Default => Ok(default.to_string()),
            SaveTarget::Custom(name) => {
                Constraint::Filename.check("file name", name, self.script)?;
                Ok(flat_file_name(name))
            }
        }
    }

    fn write_file(&self, file_name: &str, records: &[VoterRecord]) -> Result<SavedFile> {
        let path = self.file_path(file_name);
        write_records(&path, self.script, records)?;
        info!(file = file_name, rows = records.len(), "saved results");
        Ok(SavedFile {
            file_name: file_name.to_string(),
            path,
            rows: records.len(),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store_path", &self.store_path)
            .field("mode", &self.mode)
            .field("last_search", &self.last_search)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollError;
    use crate::test_support::TempDir;

    fn raw(surname: &str, year: &str, address: &str, city: &str) -> RawVoter {
        RawVoter {
            surname: surname.into(),
            given_name: "Иван".into(),
            patronymic: "Иванович".into(),
            birth_year: year.into(),
            address: address.into(),
            birth_city: city.into(),
        }
    }

    fn session(dir: &TempDir) -> Session {
        let config = Config::for_dir(dir.path(), Script::Cyrillic);
        Session::open(&config, "roll", true).unwrap()
    }

    #[test]
    fn open_existing_requires_the_file() {
        let dir = TempDir::new("session-open");
        let config = Config::for_dir(dir.path(), Script::Cyrillic);
        let err = Session::open(&config, "absent", false).unwrap_err();
        assert!(matches!(err, RollError::MissingStore { .. }));

        drop(Session::open(&config, "present", true).unwrap());
        let reopened = Session::open(&config, "present", false).unwrap();
        assert_eq!(reopened.mode(), InsertMode::Append);
        assert_eq!(reopened.store_name(), "present");

        assert!(Session::open(&config, "bad/name", true)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn empty_search_leaves_state_untouched() {
        let dir = TempDir::new("session-empty");
        let mut session = session(&dir);
        session.insert(&raw("Петров", "1990", "Ленина 10 5", "Казань")).unwrap();

        assert!(session
            .search(&Criterion::ByBirthCity("Омск".into()))
            .unwrap()
            .is_empty());
        assert!(session.last_search().is_unset());

        assert_eq!(
            session
                .search(&Criterion::ByBirthCity("Казань".into()))
                .unwrap()
                .len(),
            1
        );
        assert!(!session.last_search().is_unset());
    }

    #[test]
    fn saving_under_a_custom_name_redirects_later_inserts() {
        let dir = TempDir::new("session-custom");
        let mut session = session(&dir);
        session.insert(&raw("Петров", "1990", "Ленина 10 5", "Казань")).unwrap();

        let criterion = Criterion::ByBirthYear(1990);
        session.search(&criterion).unwrap();
        let saved = session
            .save_search_results(&criterion, &SaveTarget::Custom("nineties".into()))
            .unwrap();
        assert_eq!(saved.file_name, "nineties.txt");
        assert_eq!(saved.rows, 1);

        let inserted = session
            .insert(&raw("Орлов", "1990", "Мира 1 1", "Омск"))
            .unwrap();
        assert_eq!(inserted.sync.appended, vec!["nineties.txt".to_string()]);
        assert!(!dir.join("year_sort.txt").exists());

        let contents = read_records(&dir.join("nineties.txt")).unwrap();
        assert_eq!(
            contents.records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn sorted_saves_default_to_the_field_cache() {
        let dir = TempDir::new("session-sorted");
        let mut session = session(&dir);
        session.insert(&raw("Сидоров", "1990", "Ленина 10 5", "Казань")).unwrap();
        session.insert(&raw("Алексеев", "1980", "Мира 1 1", "Омск")).unwrap();

        let outcome = session
            .sort(&SortSource::LiveTable, SortField::Surname, SortDirection::Ascending)
            .unwrap();
        let saved = session
            .save_sorted(SortField::Surname, &SaveTarget::Default, &outcome.records)
            .unwrap();
        assert_eq!(saved.file_name, "sorted_familiya.txt");

        let (name, contents) = session.read_flat_file("sorted_familiya").unwrap();
        assert_eq!(name, "sorted_familiya.txt");
        assert_eq!(
            contents.records.iter().map(|r| r.surname.as_str()).collect::<Vec<_>>(),
            vec!["Алексеев", "Сидоров"]
        );
    }
}
