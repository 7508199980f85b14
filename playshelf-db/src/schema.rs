//! SQLite schema creation and migration.

use std::time::Duration;

use playshelf_catalog::name_key;
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 3;

/// How long a connection waits on another writer before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create all tables and indexes if they don't exist.
///
/// Idempotent; safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a catalog database at the given path.
///
/// Several processes (or threads, each with its own connection) may open
/// the same file; writers queue behind each other for up to [`BUSY_TIMEOUT`].
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else if version < CURRENT_VERSION {
        migrate(&conn, version)?;
        // Tables introduced after the original version
        conn.execute_batch(SCHEMA_SQL)?;
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    // Check if schema_version table exists
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Record a schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    let mut version = from_version;
    while version < CURRENT_VERSION {
        if version == 1 {
            // v1 matched platforms by name only
            conn.execute_batch("ALTER TABLE platforms ADD COLUMN external_id INTEGER;")?;
        }
        if version == 2 {
            // v2 compared names with SQLite LOWER(), which folds ASCII only
            for table in NAME_KEYED_TABLES {
                if table_exists(conn, table)? {
                    conn.execute_batch(&format!(
                        "ALTER TABLE {table} ADD COLUMN name_key TEXT NOT NULL DEFAULT '';"
                    ))?;
                    backfill_name_keys(conn, table)?;
                }
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Tables carrying a `name_key` matching column.
const NAME_KEYED_TABLES: [&str; 4] = ["studios", "tags", "platforms", "games"];

fn table_exists(conn: &Connection, table: &str) -> Result<bool, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Compute `name_key` for every row of a table.
fn backfill_name_keys(conn: &Connection, table: &str) -> Result<(), SchemaError> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare(&format!("SELECT id, name FROM {table}"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        rows
    };
    let mut update = conn.prepare(&format!("UPDATE {table} SET name_key = ?2 WHERE id = ?1"))?;
    for (id, name) in rows {
        update.execute(params![id, name_key(&name)])?;
    }
    log::debug!("Backfilled name keys for {}", table);
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Developer studios. name_key is the Unicode case-folded name, computed on insert.
CREATE TABLE IF NOT EXISTS studios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    name_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_studios_name_key ON studios(name_key);

-- Genre tags
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    name_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_tags_name_key ON tags(name_key);

-- Hardware platforms
CREATE TABLE IF NOT EXISTS platforms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    name_key TEXT NOT NULL,
    external_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_platforms_name_key ON platforms(name_key);
CREATE UNIQUE INDEX IF NOT EXISTS idx_platforms_external
    ON platforms(external_id) WHERE external_id IS NOT NULL;

-- Games. external_id is indexed but deliberately not unique.
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id INTEGER,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    studio_id INTEGER REFERENCES studios(id),
    cover_url TEXT,
    age_rating TEXT,
    description TEXT,
    metascore INTEGER CHECK (metascore IS NULL OR metascore BETWEEN 0 AND 100),
    user_score REAL CHECK (user_score IS NULL OR user_score BETWEEN 0 AND 10),
    overall_score REAL,
    difficulty REAL,
    gameplay_hours REAL,
    times_updated INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    released_by INTEGER,
    deleted_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_games_external ON games(external_id);
CREATE INDEX IF NOT EXISTS idx_games_name_key ON games(name_key);
CREATE UNIQUE INDEX IF NOT EXISTS idx_games_studio_name
    ON games(studio_id, name) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS game_tags (
    game_id INTEGER NOT NULL REFERENCES games(id),
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY (game_id, tag_id)
);

CREATE TABLE IF NOT EXISTS game_platforms (
    game_id INTEGER NOT NULL REFERENCES games(id),
    platform_id INTEGER NOT NULL REFERENCES platforms(id),
    release_date TEXT,
    PRIMARY KEY (game_id, platform_id)
);

CREATE TABLE IF NOT EXISTS game_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL REFERENCES games(id),
    url TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_game_images_game ON game_images(game_id, sort_order);
"#;
