use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::{default_db_path, open_existing_catalog};

pub(crate) fn run_stats(db_path: Option<PathBuf>) -> Result<(), CliError> {
    let shown_path = db_path.clone().unwrap_or_else(default_db_path);
    let Some(conn) = open_existing_catalog(db_path)? else {
        return Ok(());
    };

    let stats = playshelf_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;

    log::info!(
        "{}",
        "Catalog Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", shown_path.display());
    crate::log_blank();
    log::info!("  Games:          {:>8}", stats.games);
    log::info!("  With provider:  {:>8}", stats.games_with_external_id);
    log::info!("  Released:       {:>8}", stats.games_released);
    log::info!("  Studios:        {:>8}", stats.studios);
    log::info!("  Tags:           {:>8}", stats.tags);
    log::info!("  Platforms:      {:>8}", stats.platforms);
    log::info!("  Images:         {:>8}", stats.images);

    Ok(())
}
