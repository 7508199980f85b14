use std::path::PathBuf;

use playshelf_import::{ExportError, serialize};

use crate::CliError;

use super::open_existing_catalog;

/// Run the `export` command.
pub(crate) fn run_export(
    game_id: i64,
    output: Option<PathBuf>,
    pretty: bool,
    db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let Some(conn) = open_existing_catalog(db_path)? else {
        return Ok(());
    };

    let envelope = serialize(&conn, game_id).map_err(|e| match e {
        ExportError::NotFound(_) => CliError::export(e.to_string()),
        ExportError::Db(_) => CliError::database(e.to_string()),
    })?;
    let json = if pretty {
        envelope.to_json_pretty()
    } else {
        envelope.to_json()
    }
    .map_err(|e| CliError::export(format!("Failed to encode game {}: {}", game_id, e)))?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", json))?;
            log::info!("Wrote game {} to {}", game_id, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
