//! SQLite persistence layer for the game catalog.
//!
//! Provides schema creation, entity writes (including the optimistic
//! create-or-lookup helper), and query APIs backed by SQLite (via rusqlite
//! with the bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, attach_platform, attach_tags, fill_platform_release_date, find_or_create,
    find_platform_by_external_id, find_platform_by_name, find_studio_by_name, find_tag,
    insert_game, insert_game_image, insert_platform, insert_studio, insert_tag,
    is_unique_violation, set_platform_external_id, soft_delete_game, update_game,
};
pub use queries::{
    CatalogStats, catalog_stats, count_games_with_external_id, find_game_by_external_id,
    find_game_by_name, get_game, get_studio, images_for_game, load_game_aggregate,
    platforms_for_game, studio_has_game_named, tags_for_game,
};
pub use rusqlite::Connection;
pub use schema::{open_database, open_memory};
