//! Data model types for the game catalog.
//!
//! These types represent the persistent catalog schema: games, studios, tags,
//! platforms with per-game release dates, and ordered game images.

use serde::Serialize;

// ── Game ────────────────────────────────────────────────────────────────────

/// A catalog game entry.
///
/// `overall_score`, `difficulty`, `gameplay_hours` and `times_updated` are
/// aggregates recomputed by other subsystems; the reconciliation engine
/// reads them but never writes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,
    /// Provider identifier. Not unique: the provider can be wrong, and rows
    /// may predate the import.
    pub external_id: Option<i64>,
    pub name: String,
    pub studio_id: Option<i64>,
    pub cover_url: Option<String>,
    pub age_rating: Option<String>,
    pub description: Option<String>,
    /// 0..=100
    pub metascore: Option<i64>,
    /// 0.00..=10.00
    pub user_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub difficulty: Option<f64>,
    pub gameplay_hours: Option<f64>,
    pub times_updated: i64,
    pub status: GameStatus,
    /// User who first released the entry. Set once.
    pub released_by: Option<i64>,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Publication workflow state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Pending,
    Released,
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Released => "released",
        }
    }

    /// Parse the stored column value. Unknown values are `None`.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "released" => Some(Self::Released),
            _ => None,
        }
    }
}

/// Fields used when inserting a brand-new game row.
///
/// Aggregate fields are absent on purpose: they start at their column
/// defaults and belong to other subsystems.
#[derive(Debug, Clone, Default)]
pub struct NewGame {
    pub external_id: Option<i64>,
    pub name: String,
    pub studio_id: Option<i64>,
    pub cover_url: Option<String>,
    pub age_rating: Option<String>,
    pub description: Option<String>,
    pub metascore: Option<i64>,
    pub user_score: Option<f64>,
    pub status: GameStatus,
    pub released_by: Option<i64>,
}

/// A set of column assignments for an existing game. `None` means "leave as is".
///
/// There is no way to express a write to the aggregate fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
    pub external_id: Option<i64>,
    pub studio_id: Option<i64>,
    pub cover_url: Option<String>,
    pub age_rating: Option<String>,
    pub description: Option<String>,
    pub metascore: Option<i64>,
    pub user_score: Option<f64>,
    pub status: Option<GameStatus>,
    pub released_by: Option<i64>,
}

impl GamePatch {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Column names this patch writes, in a stable order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.external_id.is_some() {
            fields.push("external_id");
        }
        if self.studio_id.is_some() {
            fields.push("studio_id");
        }
        if self.cover_url.is_some() {
            fields.push("cover_url");
        }
        if self.age_rating.is_some() {
            fields.push("age_rating");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.metascore.is_some() {
            fields.push("metascore");
        }
        if self.user_score.is_some() {
            fields.push("user_score");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.released_by.is_some() {
            fields.push("released_by");
        }
        fields
    }
}

// ── Studio / Tag / Platform ─────────────────────────────────────────────────

/// A developer studio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Studio {
    pub id: i64,
    pub name: String,
}

/// A genre tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A hardware platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub id: i64,
    pub name: String,
    /// Provider platform identifier, used for matching before names.
    pub external_id: Option<i64>,
}

// ── Owned rows ──────────────────────────────────────────────────────────────

/// An image owned by a game, displayed in `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameImage {
    pub id: i64,
    pub game_id: i64,
    pub url: String,
    pub sort_order: i64,
}

// ── Aggregate ───────────────────────────────────────────────────────────────

/// A platform as attached to a specific game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRelease {
    pub platform: Platform,
    pub release_date: Option<String>,
}

/// A game together with everything it owns or links to.
#[derive(Debug, Clone, PartialEq)]
pub struct GameAggregate {
    pub game: Game,
    pub studio: Option<Studio>,
    pub tags: Vec<Tag>,
    pub platforms: Vec<PlatformRelease>,
    pub images: Vec<GameImage>,
}
