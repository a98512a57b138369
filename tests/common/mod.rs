use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use voter_roll::{Config, RawVoter, Script, Session};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Workspace directory under the system temp dir, removed on drop.
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "voter-roll-it-{label}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create workspace");
        Self { path }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn config(&self, script: Script) -> Config {
        Config::for_dir(&self.path, script)
    }

    /// Fresh Latin-script store named `roll`.
    pub fn create_session(&self) -> Session {
        Session::open(&self.config(Script::Latin), "roll", true).expect("create store")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub fn voter(
    surname: &str,
    given_name: &str,
    year: &str,
    address: &str,
    city: &str,
) -> RawVoter {
    RawVoter {
        surname: surname.into(),
        given_name: given_name.into(),
        patronymic: "Ivanovich".into(),
        birth_year: year.into(),
        address: address.into(),
        birth_city: city.into(),
    }
}
