//! Write operations and entity lookups.

use playshelf_catalog::name_key;
use playshelf_catalog::types::*;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

impl OperationError {
    /// True when the error is a UNIQUE (or primary key) constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sqlite(e) => is_unique_violation(e),
            Self::NotFound { .. } => false,
        }
    }
}

/// True when a SQLite error was raised by a UNIQUE or PRIMARY KEY constraint.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

// ── Optimistic Create ───────────────────────────────────────────────────────

/// Look an entity up, creating it when absent.
///
/// The insert runs inside a savepoint. If it fails on a uniqueness conflict
/// (another writer created the same row between our lookup and our insert),
/// the savepoint is rolled back and the lookup is re-run so the caller gets
/// the winner's row. Returns the entity and whether this call created it.
///
/// Works both inside and outside an enclosing transaction.
pub fn find_or_create<T, L, C>(
    conn: &Connection,
    lookup: L,
    create: C,
) -> Result<(T, bool), OperationError>
where
    L: Fn(&Connection) -> Result<Option<T>, OperationError>,
    C: FnOnce(&Connection) -> Result<T, OperationError>,
{
    if let Some(found) = lookup(conn)? {
        return Ok((found, false));
    }

    conn.execute_batch("SAVEPOINT find_or_create")?;
    match create(conn) {
        Ok(created) => {
            conn.execute_batch("RELEASE find_or_create")?;
            Ok((created, true))
        }
        Err(e) if e.is_unique_violation() => {
            conn.execute_batch("ROLLBACK TO find_or_create; RELEASE find_or_create")?;
            match lookup(conn)? {
                Some(found) => {
                    log::debug!("Lost a create race, using the existing row instead");
                    Ok((found, false))
                }
                None => Err(e),
            }
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO find_or_create; RELEASE find_or_create");
            Err(e)
        }
    }
}

// ── Studio Operations ───────────────────────────────────────────────────────

/// Find a studio by name (case-insensitive, Unicode-aware).
pub fn find_studio_by_name(conn: &Connection, name: &str) -> Result<Option<Studio>, OperationError> {
    let mut stmt =
        conn.prepare("SELECT id, name FROM studios WHERE name_key = ?1 ORDER BY id LIMIT 1")?;
    let studio = stmt
        .query_row(params![name_key(name)], |row| {
            Ok(Studio {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?;
    Ok(studio)
}

/// Insert a new studio. A name differing from an existing one only by case
/// is a unique violation.
pub fn insert_studio(conn: &Connection, name: &str) -> Result<Studio, OperationError> {
    conn.execute(
        "INSERT INTO studios (name, name_key) VALUES (?1, ?2)",
        params![name, name_key(name)],
    )?;
    Ok(Studio {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

// ── Tag Operations ──────────────────────────────────────────────────────────

/// Find a tag by slug, or by case-insensitive name for legacy rows whose
/// slug was derived differently. A slug match wins over a name match.
pub fn find_tag(conn: &Connection, slug: &str, name: &str) -> Result<Option<Tag>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, slug FROM tags
         WHERE slug = ?1 OR name_key = ?2
         ORDER BY (slug = ?1) DESC, id LIMIT 1",
    )?;
    let tag = stmt
        .query_row(params![slug, name_key(name)], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
                slug: row.get(2)?,
            })
        })
        .optional()?;
    Ok(tag)
}

/// Insert a new tag.
pub fn insert_tag(conn: &Connection, name: &str, slug: &str) -> Result<Tag, OperationError> {
    conn.execute(
        "INSERT INTO tags (name, slug, name_key) VALUES (?1, ?2, ?3)",
        params![name, slug, name_key(name)],
    )?;
    Ok(Tag {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        slug: slug.to_string(),
    })
}

// ── Platform Operations ─────────────────────────────────────────────────────

fn row_to_platform(row: &rusqlite::Row<'_>) -> rusqlite::Result<Platform> {
    Ok(Platform {
        id: row.get(0)?,
        name: row.get(1)?,
        external_id: row.get(2)?,
    })
}

/// Find a platform by its provider id.
pub fn find_platform_by_external_id(
    conn: &Connection,
    external_id: i64,
) -> Result<Option<Platform>, OperationError> {
    let mut stmt =
        conn.prepare("SELECT id, name, external_id FROM platforms WHERE external_id = ?1 LIMIT 1")?;
    Ok(stmt.query_row(params![external_id], row_to_platform).optional()?)
}

/// Find a platform by name (case-insensitive, Unicode-aware).
pub fn find_platform_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Platform>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, external_id FROM platforms
         WHERE name_key = ?1 ORDER BY id LIMIT 1",
    )?;
    Ok(stmt.query_row(params![name_key(name)], row_to_platform).optional()?)
}

/// Insert a new platform.
pub fn insert_platform(
    conn: &Connection,
    name: &str,
    external_id: Option<i64>,
) -> Result<Platform, OperationError> {
    conn.execute(
        "INSERT INTO platforms (name, name_key, external_id) VALUES (?1, ?2, ?3)",
        params![name, name_key(name), external_id],
    )?;
    Ok(Platform {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        external_id,
    })
}

/// Record a provider id on a platform that has none. Returns whether a row changed.
pub fn set_platform_external_id(
    conn: &Connection,
    platform_id: i64,
    external_id: i64,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "UPDATE platforms SET external_id = ?2 WHERE id = ?1 AND external_id IS NULL",
        params![platform_id, external_id],
    )?;
    Ok(changed > 0)
}

// ── Game Operations ─────────────────────────────────────────────────────────

/// Insert a new game. Returns the generated ID.
pub fn insert_game(conn: &Connection, game: &NewGame) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO games (external_id, name, name_key, studio_id, cover_url, age_rating,
             description, metascore, user_score, status, released_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            game.external_id,
            game.name,
            name_key(&game.name),
            game.studio_id,
            game.cover_url,
            game.age_rating,
            game.description,
            game.metascore,
            game.user_score,
            game.status.as_str(),
            game.released_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Apply a patch to an existing game. An empty patch is a no-op and does not
/// touch `updated_at`.
pub fn update_game(conn: &Connection, id: i64, patch: &GamePatch) -> Result<(), OperationError> {
    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(v) = patch.external_id {
        assignments.push("external_id");
        values.push(Box::new(v));
    }
    if let Some(v) = patch.studio_id {
        assignments.push("studio_id");
        values.push(Box::new(v));
    }
    if let Some(ref v) = patch.cover_url {
        assignments.push("cover_url");
        values.push(Box::new(v.clone()));
    }
    if let Some(ref v) = patch.age_rating {
        assignments.push("age_rating");
        values.push(Box::new(v.clone()));
    }
    if let Some(ref v) = patch.description {
        assignments.push("description");
        values.push(Box::new(v.clone()));
    }
    if let Some(v) = patch.metascore {
        assignments.push("metascore");
        values.push(Box::new(v));
    }
    if let Some(v) = patch.user_score {
        assignments.push("user_score");
        values.push(Box::new(v));
    }
    if let Some(v) = patch.status {
        assignments.push("status");
        values.push(Box::new(v.as_str()));
    }
    if let Some(v) = patch.released_by {
        assignments.push("released_by");
        values.push(Box::new(v));
    }

    if assignments.is_empty() {
        return Ok(());
    }

    // Column names come from the fixed list above, never from input.
    let set_clause: Vec<String> = assignments
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col} = ?{}", i + 2))
        .collect();
    let sql = format!(
        "UPDATE games SET {}, updated_at = datetime('now') WHERE id = ?1",
        set_clause.join(", ")
    );

    let mut param_refs: Vec<&dyn ToSql> = vec![&id];
    param_refs.extend(values.iter().map(|v| v.as_ref()));

    let changed = conn.execute(&sql, param_refs.as_slice())?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "game".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Soft-delete a game. Deleted games are invisible to matching.
pub fn soft_delete_game(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE games SET deleted_at = datetime('now') WHERE id = ?1 AND deleted_at IS NULL",
        params![id],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "game".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Pivot Operations ────────────────────────────────────────────────────────

/// Link tags to a game. Existing links are left alone.
pub fn attach_tags(conn: &Connection, game_id: i64, tag_ids: &[i64]) -> Result<usize, OperationError> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO game_tags (game_id, tag_id) VALUES (?1, ?2)")?;
    let mut attached = 0;
    for tag_id in tag_ids {
        attached += stmt.execute(params![game_id, tag_id])?;
    }
    Ok(attached)
}

/// Link a platform to a game. Returns whether a new link was created.
pub fn attach_platform(
    conn: &Connection,
    game_id: i64,
    platform_id: i64,
    release_date: Option<&str>,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO game_platforms (game_id, platform_id, release_date)
         VALUES (?1, ?2, ?3)",
        params![game_id, platform_id, release_date],
    )?;
    Ok(changed > 0)
}

/// Set a link's release date only if it has none. Returns whether a row changed.
pub fn fill_platform_release_date(
    conn: &Connection,
    game_id: i64,
    platform_id: i64,
    release_date: &str,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "UPDATE game_platforms SET release_date = ?3
         WHERE game_id = ?1 AND platform_id = ?2 AND release_date IS NULL",
        params![game_id, platform_id, release_date],
    )?;
    Ok(changed > 0)
}

/// Append an image to a game.
pub fn insert_game_image(
    conn: &Connection,
    game_id: i64,
    url: &str,
    sort_order: i64,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO game_images (game_id, url, sort_order) VALUES (?1, ?2, ?3)",
        params![game_id, url, sort_order],
    )?;
    Ok(conn.last_insert_rowid())
}
