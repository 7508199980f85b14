//! Fill-blank-only merge policy.
//!
//! Pure decisions about which local fields a provider record may write. A
//! local value is only ever replaced when it is blank: `None`, an empty or
//! whitespace string, or a zero number. Aggregate fields owned by other
//! subsystems (overall score, difficulty, gameplay hours, update counters)
//! cannot be expressed in a [`GamePatch`] at all.

use playshelf_catalog::types::*;
use playshelf_catalog::{clean_name, is_blank};

/// Descriptive values offered by a provider record, already resolved to
/// local ids where needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingFields {
    pub studio_id: Option<i64>,
    pub cover_url: Option<String>,
    pub age_rating: Option<String>,
    pub description: Option<String>,
    pub metascore: Option<i64>,
    pub user_score: Option<f64>,
}

/// Value to write into a text field, if any.
pub fn fill_blank_text(current: Option<&str>, incoming: Option<&str>) -> Option<String> {
    if is_blank(current) {
        incoming.and_then(clean_name)
    } else {
        None
    }
}

/// Value to write into an integer field, if any. Zero counts as blank.
pub fn fill_blank_int(current: Option<i64>, incoming: Option<i64>) -> Option<i64> {
    match current {
        Some(v) if v != 0 => None,
        _ => incoming.filter(|v| *v != 0),
    }
}

/// Value to write into a score field, if any. Zero counts as blank.
pub fn fill_blank_score(current: Option<f64>, incoming: Option<f64>) -> Option<f64> {
    match current {
        Some(v) if v != 0.0 => None,
        _ => incoming.filter(|v| *v != 0.0),
    }
}

/// Compute the descriptive-field patch for an existing game.
///
/// Status is not decided here; see [`promote_status`].
pub fn plan_field_patch(game: &Game, incoming: &IncomingFields) -> GamePatch {
    GamePatch {
        studio_id: fill_blank_int(game.studio_id, incoming.studio_id),
        cover_url: fill_blank_text(game.cover_url.as_deref(), incoming.cover_url.as_deref()),
        age_rating: fill_blank_text(game.age_rating.as_deref(), incoming.age_rating.as_deref()),
        description: fill_blank_text(game.description.as_deref(), incoming.description.as_deref()),
        metascore: fill_blank_int(game.metascore, incoming.metascore),
        user_score: fill_blank_score(game.user_score, incoming.user_score),
        ..Default::default()
    }
}

// ── Status ──────────────────────────────────────────────────────────────────

/// Status columns to write alongside an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub status: Option<GameStatus>,
    pub released_by: Option<i64>,
}

/// Writing imported data into a game publishes it.
///
/// A game that is not yet released becomes released, and `released_by` is
/// set to the acting user unless someone already holds it. Released games
/// are left alone.
pub fn promote_status(
    current: GameStatus,
    released_by: Option<i64>,
    acting_user: Option<i64>,
) -> StatusPatch {
    if current == GameStatus::Released {
        return StatusPatch::default();
    }
    StatusPatch {
        status: Some(GameStatus::Released),
        released_by: if released_by.is_none() {
            acting_user
        } else {
            None
        },
    }
}

/// Fold a status decision into a field patch.
pub fn apply_status(patch: &mut GamePatch, status: StatusPatch) {
    patch.status = status.status;
    patch.released_by = status.released_by;
}

// ── Collections ─────────────────────────────────────────────────────────────

/// What to do with a game's tags, platforms or images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMerge {
    /// The local collection is empty: attach everything the provider offers.
    AttachAll,
    /// The local collection has entries: leave it as curated.
    Leave,
}

pub fn merge_collection(local_len: usize) -> CollectionMerge {
    if local_len == 0 {
        CollectionMerge::AttachAll
    } else {
        CollectionMerge::Leave
    }
}
