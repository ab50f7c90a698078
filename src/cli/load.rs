use std::path::PathBuf;

use crate::db::DB_FILE;
use crate::error::{EconomiaError, Result};
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    let db_path = resolved.join(DB_FILE);

    if !db_path.exists() {
        return Err(EconomiaError::Settings(format!(
            "No database found at {}\nRun `economia init --data-dir {}` to create one.",
            db_path.display(),
            resolved.display()
        )));
    }

    // Accounts live in the database, so a session from another data directory is stale.
    let mut settings = load_settings();
    settings.data_dir = resolved.to_string_lossy().to_string();
    settings.session = None;
    save_settings(&settings)?;

    println!("Switched to {}", resolved.display());
    println!("Sign in with `economia login --email <EMAIL>`.");
    Ok(())
}
