use std::future::Future;

use tokio::time::Duration;

use crate::error::ProviderError;
use crate::settings::Settings;
use crate::types::{ProviderRecord, RawGame};

/// Hard limit on a single provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Anything that can produce a provider record by external id.
///
/// The reconciliation engine is generic over this so it can run against a
/// canned source in tests.
pub trait RecordSource {
    fn fetch_by_id(
        &self,
        external_id: i64,
    ) -> impl Future<Output = Result<ProviderRecord, ProviderError>> + Send;
}

/// HTTP client for the provider's game detail endpoint.
///
/// One GET per call, no retries and no rate limiting.
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProviderClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ProviderError> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a client from loaded settings. Fails when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let key = settings.provider_api_key.as_deref().ok_or_else(|| {
            ProviderError::Config(format!(
                "Missing provider API key. Set {} or add api_key to the [provider] table of the config file",
                crate::settings::ENV_PROVIDER_API_KEY
            ))
        })?;
        Self::new(&settings.provider_base_url, key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one game record.
    pub async fn fetch_game(&self, external_id: i64) -> Result<ProviderRecord, ProviderError> {
        let url = format!("{}/games/{}", self.base_url, external_id);
        log::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable {
                external_id,
                reason: describe(&e),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound { external_id });
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable {
                external_id,
                reason: format!("HTTP {}", status),
            });
        }

        let text = resp.text().await.map_err(|e| ProviderError::Unavailable {
            external_id,
            reason: describe(&e),
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
                external_id,
                reason: format!("{e}. Response: {}", truncate(&text, 200)),
            })?;
        if !value.is_object() {
            return Err(ProviderError::Malformed {
                external_id,
                reason: format!("expected a JSON object. Response: {}", truncate(&text, 200)),
            });
        }
        let raw: RawGame = serde_json::from_value(value).map_err(|e| ProviderError::Malformed {
            external_id,
            reason: e.to_string(),
        })?;

        Ok(ProviderRecord::from_raw(external_id, raw))
    }
}

impl RecordSource for ProviderClient {
    fn fetch_by_id(
        &self,
        external_id: i64,
    ) -> impl Future<Output = Result<ProviderRecord, ProviderError>> + Send {
        self.fetch_game(external_id)
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
