//! Versioned, deterministic export projection of a game.
//!
//! Field order in the serialized JSON follows struct declaration order and
//! is part of the contract: downstream consumers hash payloads, so the same
//! aggregate must always produce byte-identical output. Collections are
//! sorted here rather than trusting query order.

use serde::Serialize;

use crate::types::{GameAggregate, GameStatus};

/// Version of the export layout. Bump when fields change.
pub const EXPORT_VERSION: u32 = 1;

/// Sort keys the downstream consumer expects, sent in `meta.order`.
pub const CONSUMER_ORDER: [&str; 5] = [
    "timesUpdated",
    "-overallScore",
    "-metascore",
    "-userScore",
    "name",
];

/// Top-level webhook/export body: `{ data, meta? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEnvelope {
    pub data: GameExport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ExportMeta>,
}

impl ExportEnvelope {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON for human display.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportMeta {
    pub order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameExport {
    pub version: u32,
    pub id: i64,
    pub external_id: Option<i64>,
    pub name: String,
    pub studio: Option<String>,
    pub status: GameStatus,
    pub cover_url: Option<String>,
    pub age_rating: Option<String>,
    pub description: Option<String>,
    pub metascore: Option<i64>,
    pub user_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub difficulty: Option<f64>,
    pub gameplay_hours: Option<f64>,
    pub times_updated: i64,
    pub tags: Vec<TagExport>,
    pub platforms: Vec<PlatformExport>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagExport {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformExport {
    pub name: String,
    pub release_date: Option<String>,
}

/// Project a game aggregate into its export form.
pub fn project(aggregate: &GameAggregate) -> GameExport {
    let game = &aggregate.game;

    let mut tags: Vec<_> = aggregate.tags.iter().collect();
    tags.sort_by(|a, b| a.slug.cmp(&b.slug).then_with(|| a.id.cmp(&b.id)));

    let mut platforms: Vec<_> = aggregate.platforms.iter().collect();
    platforms.sort_by(|a, b| {
        a.platform
            .name
            .cmp(&b.platform.name)
            .then_with(|| a.platform.id.cmp(&b.platform.id))
    });

    let mut images: Vec<_> = aggregate.images.iter().collect();
    images.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));

    GameExport {
        version: EXPORT_VERSION,
        id: game.id,
        external_id: game.external_id,
        name: game.name.clone(),
        studio: aggregate.studio.as_ref().map(|s| s.name.clone()),
        status: game.status,
        cover_url: game.cover_url.clone(),
        age_rating: game.age_rating.clone(),
        description: game.description.clone(),
        metascore: game.metascore,
        user_score: game.user_score,
        overall_score: game.overall_score,
        difficulty: game.difficulty,
        gameplay_hours: game.gameplay_hours,
        times_updated: game.times_updated,
        tags: tags
            .into_iter()
            .map(|t| TagExport {
                name: t.name.clone(),
                slug: t.slug.clone(),
            })
            .collect(),
        platforms: platforms
            .into_iter()
            .map(|p| PlatformExport {
                name: p.platform.name.clone(),
                release_date: p.release_date.clone(),
            })
            .collect(),
        images: images.into_iter().map(|i| i.url.clone()).collect(),
    }
}

/// Project a game and wrap it with the consumer ordering metadata.
pub fn envelope(aggregate: &GameAggregate) -> ExportEnvelope {
    ExportEnvelope {
        data: project(aggregate),
        meta: Some(ExportMeta {
            order: CONSUMER_ORDER.iter().map(|s| s.to_string()).collect(),
        }),
    }
}
