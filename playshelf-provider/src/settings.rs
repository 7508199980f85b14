use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default provider API root.
pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";

pub const ENV_PROVIDER_API_KEY: &str = "PLAYSHELF_PROVIDER_API_KEY";
pub const ENV_PROVIDER_BASE_URL: &str = "PLAYSHELF_PROVIDER_BASE_URL";
pub const ENV_WEBHOOK_URL: &str = "PLAYSHELF_WEBHOOK_URL";
pub const ENV_WEBHOOK_API_KEY: &str = "PLAYSHELF_WEBHOOK_API_KEY";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Runtime settings for the provider client and the webhook notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider_api_key: Option<String>,
    pub provider_base_url: String,
    pub webhook_url: Option<String>,
    pub webhook_api_key: Option<String>,
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Hard-coded default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug)]
pub struct SettingSources {
    pub provider_api_key: SettingSource,
    pub provider_base_url: SettingSource,
    pub webhook_url: SettingSource,
    pub webhook_api_key: SettingSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: Option<ProviderSection>,
    #[serde(default)]
    pub webhook: Option<WebhookSection>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ProviderSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct WebhookSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn provider_api_key(&self) -> Option<String> {
        self.provider.as_ref().and_then(|p| p.api_key.clone())
    }

    fn provider_base_url(&self) -> Option<String> {
        self.provider.as_ref().and_then(|p| p.base_url.clone())
    }

    fn webhook_url(&self) -> Option<String> {
        self.webhook.as_ref().and_then(|w| w.url.clone())
    }

    fn webhook_api_key(&self) -> Option<String> {
        self.webhook.as_ref().and_then(|w| w.api_key.clone())
    }
}

impl Settings {
    /// Load settings from environment variables and the config file.
    ///
    /// Priority: env vars > config file > default. Nothing here is required;
    /// commands that need the provider check for the key themselves.
    pub fn load() -> Self {
        Self::resolve(&env_lookup, &load_config_file().unwrap_or_default())
    }

    /// Resolve settings from an explicit environment and config file.
    pub fn resolve(env: &dyn Fn(&str) -> Option<String>, config: &ConfigFile) -> Self {
        Self {
            provider_api_key: env(ENV_PROVIDER_API_KEY).or_else(|| config.provider_api_key()),
            provider_base_url: env(ENV_PROVIDER_BASE_URL)
                .or_else(|| config.provider_base_url())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            webhook_url: env(ENV_WEBHOOK_URL).or_else(|| config.webhook_url()),
            webhook_api_key: env(ENV_WEBHOOK_API_KEY).or_else(|| config.webhook_api_key()),
        }
    }
}

/// Return the path to the config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playshelf").join("config.toml"))
}

/// Determine where each setting is coming from.
pub fn settings_sources() -> SettingSources {
    sources_from(&env_lookup, &load_config_file().unwrap_or_default())
}

/// Determine provenance from an explicit environment and config file.
pub fn sources_from(env: &dyn Fn(&str) -> Option<String>, config: &ConfigFile) -> SettingSources {
    let pick = |var: &'static str, in_file: bool, fallback: SettingSource| {
        if env(var).is_some() {
            SettingSource::EnvVar(var)
        } else if in_file {
            SettingSource::ConfigFile
        } else {
            fallback
        }
    };

    SettingSources {
        provider_api_key: pick(
            ENV_PROVIDER_API_KEY,
            config.provider_api_key().is_some(),
            SettingSource::Missing,
        ),
        provider_base_url: pick(
            ENV_PROVIDER_BASE_URL,
            config.provider_base_url().is_some(),
            SettingSource::Default,
        ),
        webhook_url: pick(
            ENV_WEBHOOK_URL,
            config.webhook_url().is_some(),
            SettingSource::Missing,
        ),
        webhook_api_key: pick(
            ENV_WEBHOOK_API_KEY,
            config.webhook_api_key().is_some(),
            SettingSource::Missing,
        ),
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn load_config_file() -> Option<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }
    match ConfigFile::load(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Ignoring config file: {}", e);
            None
        }
    }
}
