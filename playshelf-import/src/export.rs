//! Export of persisted games.

use playshelf_catalog::{ExportEnvelope, envelope};
use playshelf_db::operations::OperationError;
use playshelf_db::queries;
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("Game {0} not found")]
    NotFound(i64),
}

/// Load a game with everything it links to and project it into the
/// versioned export envelope.
pub fn serialize(conn: &Connection, game_id: i64) -> Result<ExportEnvelope, ExportError> {
    let aggregate =
        queries::load_game_aggregate(conn, game_id)?.ok_or(ExportError::NotFound(game_id))?;
    Ok(envelope(&aggregate))
}
