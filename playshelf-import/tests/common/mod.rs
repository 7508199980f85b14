//! Shared fixtures for import tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use playshelf_provider::{ProviderError, ProviderRecord, RawGame, RecordSource};

/// Decode a provider JSON body the way the real client does.
pub fn record(external_id: i64, json: &str) -> ProviderRecord {
    let raw: RawGame = serde_json::from_str(json).unwrap();
    ProviderRecord::from_raw(external_id, raw)
}

/// The record from the "Nova" walkthrough.
pub const NOVA: &str = r#"{
    "name": "Nova",
    "metacritic": null,
    "rating": 4.5,
    "developers": [{"name": "Studio X"}],
    "genres": [{"name": "RPG"}],
    "platforms": [{"platform": {"name": "PC"}}],
    "released": "2020-01-01"
}"#;

/// A canned provider.
#[derive(Default)]
pub struct FakeSource {
    records: HashMap<i64, ProviderRecord>,
    unavailable: HashSet<i64>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, external_id: i64, json: &str) -> Self {
        self.records.insert(external_id, record(external_id, json));
        self
    }

    pub fn with_record(mut self, record: ProviderRecord) -> Self {
        self.records.insert(record.external_id, record);
        self
    }

    pub fn down(mut self, external_id: i64) -> Self {
        self.unavailable.insert(external_id);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RecordSource for FakeSource {
    async fn fetch_by_id(&self, external_id: i64) -> Result<ProviderRecord, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.contains(&external_id) {
            return Err(ProviderError::Unavailable {
                external_id,
                reason: "request timed out".to_string(),
            });
        }
        self.records
            .get(&external_id)
            .cloned()
            .ok_or(ProviderError::NotFound { external_id })
    }
}
