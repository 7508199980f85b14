//! Client for the external game metadata provider.
//!
//! Fetches a single game record by provider id and decodes it into a
//! [`ProviderRecord`] whose fields have all been checked for usability.
//! Settings for the provider and the outbound webhook live here too.

pub mod client;
pub mod error;
pub mod settings;
pub mod types;

pub use client::{ProviderClient, REQUEST_TIMEOUT, RecordSource};
pub use error::ProviderError;
pub use settings::{
    ConfigFile, DEFAULT_BASE_URL, SettingSource, SettingSources, Settings, SettingsError,
    config_path, settings_sources, sources_from,
};
pub use types::{
    ProviderGenre, ProviderPlatform, ProviderRecord, RawGame, parse_date, rating_to_user_score,
};
