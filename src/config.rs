//! Runtime configuration. Everything has a default, so a bare start needs no
//! environment at all; `.env` is honoured when present.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::models::Script;

/// Folder name used beneath the user's home directory for stores and files.
const DATA_DIR_NAME: &str = ".voter-roll";
/// Store name suggested on the "use existing store" prompt.
pub const DEFAULT_STORE_NAME: &str = "list_voiters1";
/// Log file written inside the workspace directory.
pub const LOG_FILE_NAME: &str = "voter-roll.log";

const HOME_VAR: &str = "VOTER_ROLL_HOME";
const SCRIPT_VAR: &str = "VOTER_ROLL_SCRIPT";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the `.db` stores, every flat file and the log.
    pub workspace_dir: PathBuf,
    /// Letter class used by validators, address template and file headers.
    pub script: Script,
    pub default_store: String,
}

impl Config {
    /// Load from `VOTER_ROLL_HOME` / `VOTER_ROLL_SCRIPT`, falling back to
    /// `~/.voter-roll` and Cyrillic.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let workspace_dir = match std::env::var_os(HOME_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                base_dirs.home_dir().join(DATA_DIR_NAME)
            }
        };

        let script = match std::env::var(SCRIPT_VAR) {
            Ok(name) => Script::from_name(&name)
                .ok_or_else(|| anyhow!("{SCRIPT_VAR} must be 'cyrillic' or 'latin', got '{name}'"))?,
            Err(_) => Script::default(),
        };

        Ok(Self {
            workspace_dir,
            script,
            default_store: DEFAULT_STORE_NAME.to_string(),
        })
    }

    /// Configuration rooted at `dir`, used by tests and embedding callers.
    pub fn for_dir(dir: impl AsRef<Path>, script: Script) -> Self {
        Self {
            workspace_dir: dir.as_ref().to_path_buf(),
            script,
            default_store: DEFAULT_STORE_NAME.to_string(),
        }
    }

    /// Create the workspace directory if needed.
    pub fn ensure_workspace(&self) -> Result<()> {
        fs::create_dir_all(&self.workspace_dir).with_context(|| {
            format!(
                "failed to create workspace directory {}",
                self.workspace_dir.display()
            )
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.workspace_dir.join(LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    #[test]
    fn for_dir_uses_defaults() {
        let config = Config::for_dir("/tmp/roll", Script::Latin);
        assert_eq!(config.default_store, "list_voiters1");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/roll/voter-roll.log"));
    }

    #[test]
    fn ensure_workspace_creates_nested_dirs() {
        let dir = TempDir::new("config");
        let config = Config::for_dir(dir.join("a/b"), Script::Cyrillic);
        config.ensure_workspace().unwrap();
        assert!(config.workspace_dir.is_dir());
    }
}
