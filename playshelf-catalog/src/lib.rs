//! Game catalog data model types, platform alias tables, and export projection.
//!
//! This crate defines the persistent data model for the game catalog without
//! any database dependencies. Consumers can use these types directly for
//! serialization, display, or passing to `playshelf-db` for persistence.

pub mod aliases;
pub mod export;
pub mod names;
pub mod types;

pub use aliases::{AliasError, PlatformAliases};
pub use export::{
    CONSUMER_ORDER, EXPORT_VERSION, ExportEnvelope, ExportMeta, GameExport, PlatformExport,
    TagExport, envelope, project,
};
pub use names::{clean_name, is_blank, is_numeric_only, name_key, slugify};
pub use types::*;
