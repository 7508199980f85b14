//! Platform alias normalization.
//!
//! Provider platform names do not always match the names used in the local
//! catalog ("Genesis" vs "Mega Drive"). A [`PlatformAliases`] table maps
//! provider names to local names before the case-insensitive name match.
//! The built-in table can be replaced by a YAML file:
//!
//! ```yaml
//! NES: Nintendo 8bits
//! SNES: Super Nintendo
//! Genesis: Mega Drive
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AliasError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
}

/// Built-in provider name → local name mappings.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("NES", "Nintendo 8bits"),
    ("SNES", "Super Nintendo"),
    ("Genesis", "Mega Drive"),
];

/// Lookup table from provider platform names to local platform names.
///
/// Keys are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAliases {
    entries: BTreeMap<String, String>,
}

impl Default for PlatformAliases {
    fn default() -> Self {
        Self::from_pairs(BUILTIN_ALIASES.iter().copied())
    }
}

impl PlatformAliases {
    /// A table with no aliases at all.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build a table from `(provider_name, local_name)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(from, to)| (from.trim().to_lowercase(), to.trim().to_string()))
            .collect();
        Self { entries }
    }

    /// Load a table from a YAML mapping file.
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        let contents = std::fs::read_to_string(path).map_err(|e| AliasError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let map: BTreeMap<String, String> =
            serde_yml::from_str(&contents).map_err(|e| AliasError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(Self::from_pairs(
            map.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    /// Return the local name for a provider name, or the input unchanged.
    pub fn normalize<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
            .unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
