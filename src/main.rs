//! Binary entry point: resolve the workspace, start logging and drive the
//! Ratatui event loop until the operator exits.
use tracing::info;
use voter_roll::{init_logging, run_app, App, Config};

/// Returning a `Result` bubbles fatal problems (an unwritable workspace, a
/// store SQLite cannot open) to the shell once the terminal is restored.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    config.ensure_workspace()?;
    init_logging(&config)?;
    info!(workspace = %config.workspace_dir.display(), script = ?config.script, "starting voter roll");

    let mut app = App::new(config);
    run_app(&mut app)
}
