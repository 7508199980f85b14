pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod notify;
pub(crate) mod reconcile;
pub(crate) mod show;
pub(crate) mod stats;

use std::path::{Path, PathBuf};

use playshelf_db::Connection;

use crate::CliError;

pub(crate) fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("playshelf"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog.db")
}

/// Open (creating if needed) the catalog database.
pub(crate) fn open_catalog(db_path: Option<PathBuf>) -> Result<(Connection, PathBuf), CliError> {
    let db_path = db_path.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = open_path(&db_path)?;
    Ok((conn, db_path))
}

/// Open an existing catalog database. A missing file is reported, not created.
pub(crate) fn open_existing_catalog(db_path: Option<PathBuf>) -> Result<Option<Connection>, CliError> {
    let db_path = db_path.unwrap_or_else(default_db_path);
    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        log::info!("Run 'playshelf reconcile <ids>' to create one.");
        return Ok(None);
    }
    open_path(&db_path).map(Some)
}

fn open_path(db_path: &Path) -> Result<Connection, CliError> {
    playshelf_db::open_database(db_path).map_err(|e| {
        CliError::database(format!(
            "Failed to open catalog database {}: {}",
            db_path.display(),
            e
        ))
    })
}

/// Build the single-threaded runtime commands use to drive async calls.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}
