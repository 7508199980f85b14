//! Read queries for the catalog database.
//!
//! Provides game lookup by id, provider id and name, aggregate loading for
//! export, and summary statistics. Soft-deleted games are excluded from
//! every lookup except [`get_game`].

use playshelf_catalog::name_key;
use playshelf_catalog::types::*;
use rusqlite::{Connection, OptionalExtension, params};

use crate::operations::OperationError;

const GAME_COLUMNS: &str = "id, external_id, name, studio_id, cover_url, age_rating,
    description, metascore, user_score, overall_score, difficulty, gameplay_hours,
    times_updated, status, released_by, deleted_at, created_at, updated_at";

// ── Game Lookups ────────────────────────────────────────────────────────────

/// Fetch a game by id, including soft-deleted rows.
pub fn get_game(conn: &Connection, id: i64) -> Result<Option<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id], row_to_game).optional()?)
}

/// Find the oldest live game carrying a provider id.
pub fn find_game_by_external_id(
    conn: &Connection,
    external_id: i64,
) -> Result<Option<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS} FROM games
         WHERE external_id = ?1 AND deleted_at IS NULL
         ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![external_id], row_to_game).optional()?)
}

/// Find a live game by name (case-insensitive, Unicode-aware, any studio).
///
/// Rows without a provider id are preferred, so a manually entered game is
/// claimed before a collision with another provider entry is reported.
pub fn find_game_by_name(conn: &Connection, name: &str) -> Result<Option<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS} FROM games
         WHERE name_key = ?1 AND deleted_at IS NULL
         ORDER BY (external_id IS NOT NULL), id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![name_key(name)], row_to_game).optional()?)
}

/// Whether a studio already owns a live game with exactly this name.
pub fn studio_has_game_named(
    conn: &Connection,
    studio_id: i64,
    name: &str,
) -> Result<bool, OperationError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM games
             WHERE studio_id = ?1 AND name = ?2 AND deleted_at IS NULL)",
        params![studio_id, name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Count live games carrying a provider id.
pub fn count_games_with_external_id(
    conn: &Connection,
    external_id: i64,
) -> Result<i64, OperationError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM games WHERE external_id = ?1 AND deleted_at IS NULL",
        params![external_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Related Rows ────────────────────────────────────────────────────────────

/// Fetch a studio by id.
pub fn get_studio(conn: &Connection, id: i64) -> Result<Option<Studio>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name FROM studios WHERE id = ?1")?;
    let studio = stmt
        .query_row(params![id], |row| {
            Ok(Studio {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?;
    Ok(studio)
}

/// Tags linked to a game, ordered by slug.
pub fn tags_for_game(conn: &Connection, game_id: i64) -> Result<Vec<Tag>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.slug FROM tags t
         JOIN game_tags gt ON gt.tag_id = t.id
         WHERE gt.game_id = ?1 ORDER BY t.slug",
    )?;
    let rows = stmt.query_map(params![game_id], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Platforms linked to a game with their per-platform release dates.
pub fn platforms_for_game(
    conn: &Connection,
    game_id: i64,
) -> Result<Vec<PlatformRelease>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.external_id, gp.release_date FROM platforms p
         JOIN game_platforms gp ON gp.platform_id = p.id
         WHERE gp.game_id = ?1 ORDER BY p.name, p.id",
    )?;
    let rows = stmt.query_map(params![game_id], |row| {
        Ok(PlatformRelease {
            platform: Platform {
                id: row.get(0)?,
                name: row.get(1)?,
                external_id: row.get(2)?,
            },
            release_date: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Images owned by a game, in display order.
pub fn images_for_game(conn: &Connection, game_id: i64) -> Result<Vec<GameImage>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, game_id, url, sort_order FROM game_images
         WHERE game_id = ?1 ORDER BY sort_order, id",
    )?;
    let rows = stmt.query_map(params![game_id], |row| {
        Ok(GameImage {
            id: row.get(0)?,
            game_id: row.get(1)?,
            url: row.get(2)?,
            sort_order: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Load a game with its studio, tags, platforms and images.
pub fn load_game_aggregate(
    conn: &Connection,
    game_id: i64,
) -> Result<Option<GameAggregate>, OperationError> {
    let Some(game) = get_game(conn, game_id)? else {
        return Ok(None);
    };
    let studio = match game.studio_id {
        Some(id) => get_studio(conn, id)?,
        None => None,
    };
    Ok(Some(GameAggregate {
        tags: tags_for_game(conn, game_id)?,
        platforms: platforms_for_game(conn, game_id)?,
        images: images_for_game(conn, game_id)?,
        studio,
        game,
    }))
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalog statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let games: i64 = conn.query_row(
        "SELECT COUNT(*) FROM games WHERE deleted_at IS NULL",
        [],
        |r| r.get(0),
    )?;
    let linked: i64 = conn.query_row(
        "SELECT COUNT(*) FROM games WHERE deleted_at IS NULL AND external_id IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let released: i64 = conn.query_row(
        "SELECT COUNT(*) FROM games WHERE deleted_at IS NULL AND status = 'released'",
        [],
        |r| r.get(0),
    )?;
    let studios: i64 = conn.query_row("SELECT COUNT(*) FROM studios", [], |r| r.get(0))?;
    let tags: i64 = conn.query_row("SELECT COUNT(*) FROM tags", [], |r| r.get(0))?;
    let platforms: i64 = conn.query_row("SELECT COUNT(*) FROM platforms", [], |r| r.get(0))?;
    let images: i64 = conn.query_row("SELECT COUNT(*) FROM game_images", [], |r| r.get(0))?;

    Ok(CatalogStats {
        games,
        games_with_external_id: linked,
        games_released: released,
        studios,
        tags,
        platforms,
        images,
    })
}

/// Summary statistics for the catalog.
#[derive(Debug)]
pub struct CatalogStats {
    pub games: i64,
    pub games_with_external_id: i64,
    pub games_released: i64,
    pub studios: i64,
    pub tags: i64,
    pub platforms: i64,
    pub images: i64,
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<Game> {
    let status_str: String = row.get(13)?;
    let status = GameStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            13,
            rusqlite::types::Type::Text,
            format!("unknown game status '{}'", status_str).into(),
        )
    })?;
    Ok(Game {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        studio_id: row.get(3)?,
        cover_url: row.get(4)?,
        age_rating: row.get(5)?,
        description: row.get(6)?,
        metascore: row.get(7)?,
        user_score: row.get(8)?,
        overall_score: row.get(9)?,
        difficulty: row.get(10)?,
        gameplay_hours: row.get(11)?,
        times_updated: row.get(12)?,
        status,
        released_by: row.get(14)?,
        deleted_at: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}
