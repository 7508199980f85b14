/// Errors that can occur while talking to the metadata provider.
///
/// For reconciliation purposes every variant means "no usable record";
/// the variant only decides how loudly the failure is logged.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Game {external_id} not found at provider")]
    NotFound { external_id: i64 },

    #[error("Provider unavailable for game {external_id}: {reason}")]
    Unavailable { external_id: i64, reason: String },

    #[error("Malformed provider response for game {external_id}: {reason}")]
    Malformed { external_id: i64, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// True when the provider answered that the id does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
