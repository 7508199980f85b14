//! Best-effort webhook delivery of exported games.
//!
//! One POST per notification, no retry and no queue. The catalog stays the
//! source of truth; a consumer that misses a delivery can re-pull.

use playshelf_catalog::ExportEnvelope;
use playshelf_provider::Settings;
use rusqlite::Connection;
use tokio::time::Duration;

use crate::export::serialize;

/// Hard limit on a single webhook delivery.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the webhook API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// What happened to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The endpoint answered with a 2xx status.
    Delivered,
    /// No URL or API key is configured.
    Disabled,
    /// Delivery failed and was dropped.
    Failed(String),
}

struct Target {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

/// Posts export envelopes to a configured endpoint.
pub struct WebhookNotifier {
    target: Option<Target>,
}

impl WebhookNotifier {
    /// Create a notifier. A missing URL or key disables it with a warning.
    pub fn new(url: Option<&str>, api_key: Option<&str>) -> Self {
        Self::with_timeout(url, api_key, DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(url: Option<&str>, api_key: Option<&str>, timeout: Duration) -> Self {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
        let (Some(url), Some(api_key)) = (url, api_key) else {
            log::warn!("Webhook URL or API key not configured; notifications are disabled");
            return Self::disabled();
        };

        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(http) => Self {
                target: Some(Target {
                    http,
                    url: url.to_string(),
                    api_key: api_key.to_string(),
                }),
            },
            Err(e) => {
                log::error!("Could not build webhook HTTP client: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.webhook_url.as_deref(),
            settings.webhook_api_key.as_deref(),
        )
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self { target: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Serialize a game and deliver it.
    pub async fn notify(&self, conn: &Connection, game_id: i64) -> NotifyOutcome {
        if self.target.is_none() {
            return NotifyOutcome::Disabled;
        }
        let envelope = match serialize(conn, game_id) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::error!("Webhook for game {} not sent: {}", game_id, e);
                return NotifyOutcome::Failed(e.to_string());
            }
        };
        self.deliver(&envelope).await
    }

    /// POST an envelope to the endpoint.
    pub async fn deliver(&self, envelope: &ExportEnvelope) -> NotifyOutcome {
        let Some(target) = &self.target else {
            return NotifyOutcome::Disabled;
        };
        let game_id = envelope.data.id;

        let body = match envelope.to_json() {
            Ok(body) => body,
            Err(e) => {
                log::error!("Webhook for game {} not sent: {}", game_id, e);
                return NotifyOutcome::Failed(e.to_string());
            }
        };

        let sent = target
            .http
            .post(&target.url)
            .header(API_KEY_HEADER, &target.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match sent {
            Ok(resp) if resp.status().is_success() => {
                log::debug!("Webhook delivered for game {}", game_id);
                NotifyOutcome::Delivered
            }
            Ok(resp) => {
                let reason = format!("HTTP {}", resp.status());
                log::error!("Webhook for game {} rejected: {}", game_id, reason);
                NotifyOutcome::Failed(reason)
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                log::error!("Webhook for game {} failed: {}", game_id, reason);
                NotifyOutcome::Failed(reason)
            }
        }
    }
}
