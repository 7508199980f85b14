//! Reconciliation of provider records into the local catalog.
//!
//! A reconciliation fetches one record from the provider, matches it to a
//! local game (by provider id, then by case-insensitive name, else a new
//! row) and merges it fill-blank-only. The match and every write happen in
//! a single `BEGIN IMMEDIATE` transaction, so two reconciliations of the
//! same id serialize on the database write lock: the second one sees the
//! first one's row and proceeds as an update.

use playshelf_catalog::PlatformAliases;
use playshelf_catalog::types::*;
use playshelf_db::operations::{self, OperationError};
use playshelf_db::queries;
use playshelf_provider::{ProviderRecord, RecordSource};
use rusqlite::Connection;
use thiserror::Error;

use crate::merge::{self, CollectionMerge, IncomingFields};
use crate::progress::ReconcileProgress;
use crate::resolver::{EntityResolver, ResolveError, ResolvedEntities};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to persist external id {external_id} (game {}): {source}", game_label(.game_id))]
    Persistence {
        external_id: i64,
        game_id: Option<i64>,
        #[source]
        source: OperationError,
    },
}

fn game_label(game_id: &Option<i64>) -> String {
    match game_id {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

impl ReconcileError {
    pub fn external_id(&self) -> i64 {
        match self {
            Self::Persistence { external_id, .. } => *external_id,
        }
    }
}

/// Why a reconciliation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The external id is not a positive integer.
    InvalidId,
    /// The provider returned nothing usable (unknown id, outage, bad body).
    ProviderNotFound,
    /// The provider record has no usable name.
    MissingName,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::ProviderNotFound => "provider_not_found",
            Self::MissingName => "missing_name",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reconciling one external id.
///
/// `changes` lists the columns and collections written, in a stable order.
/// A repeated reconciliation of an unchanged record yields no changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created { game_id: i64, changes: Vec<String> },
    UpdatedByExternalId { game_id: i64, changes: Vec<String> },
    UpdatedByName { game_id: i64, changes: Vec<String> },
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    pub fn game_id(&self) -> Option<i64> {
        match self {
            Self::Created { game_id, .. }
            | Self::UpdatedByExternalId { game_id, .. }
            | Self::UpdatedByName { game_id, .. } => Some(*game_id),
            Self::Skipped(_) => None,
        }
    }

    pub fn changes(&self) -> &[String] {
        match self {
            Self::Created { changes, .. }
            | Self::UpdatedByExternalId { changes, .. }
            | Self::UpdatedByName { changes, .. } => changes,
            Self::Skipped(_) => &[],
        }
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::UpdatedByExternalId { .. } => "updated_by_external_id",
            Self::UpdatedByName { .. } => "updated_by_name",
            Self::Skipped(_) => "skipped",
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Counts from a batch of reconciliations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated_by_external_id: usize,
    pub updated_by_name: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ReconcileStats {
    pub fn record(&mut self, result: &Result<ReconcileOutcome, ReconcileError>) {
        match result {
            Ok(ReconcileOutcome::Created { .. }) => self.created += 1,
            Ok(ReconcileOutcome::UpdatedByExternalId { .. }) => self.updated_by_external_id += 1,
            Ok(ReconcileOutcome::UpdatedByName { .. }) => self.updated_by_name += 1,
            Ok(ReconcileOutcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created
            + self.updated_by_external_id
            + self.updated_by_name
            + self.skipped
            + self.failed
    }
}

/// Which local row a record matched.
enum Match {
    ByExternalId(Game),
    ByName(Game),
    New,
}

/// Reconciles provider records into one database connection.
pub struct ReconciliationEngine<'a, S> {
    conn: &'a Connection,
    source: &'a S,
    aliases: &'a PlatformAliases,
}

impl<'a, S: RecordSource> ReconciliationEngine<'a, S> {
    pub fn new(conn: &'a Connection, source: &'a S, aliases: &'a PlatformAliases) -> Self {
        Self {
            conn,
            source,
            aliases,
        }
    }

    /// Fetch a record from the provider and merge it into the catalog.
    ///
    /// Provider failures and bad input come back as [`ReconcileOutcome::Skipped`].
    /// Only a failed database write is an error, and then nothing from this
    /// call has been kept.
    pub async fn reconcile(
        &self,
        external_id: i64,
        acting_user: Option<i64>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if external_id <= 0 {
            log::debug!("Skipping invalid external id {}", external_id);
            return Ok(ReconcileOutcome::Skipped(SkipReason::InvalidId));
        }

        let record = match self.source.fetch_by_id(external_id).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => {
                log::debug!("{}", e);
                return Ok(ReconcileOutcome::Skipped(SkipReason::ProviderNotFound));
            }
            Err(e) => {
                log::warn!("{}", e);
                return Ok(ReconcileOutcome::Skipped(SkipReason::ProviderNotFound));
            }
        };

        self.apply(&record, acting_user)
    }

    /// Merge an already fetched record into the catalog.
    pub fn apply(
        &self,
        record: &ProviderRecord,
        acting_user: Option<i64>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let external_id = record.external_id;
        if external_id <= 0 {
            log::debug!("Skipping invalid external id {}", external_id);
            return Ok(ReconcileOutcome::Skipped(SkipReason::InvalidId));
        }
        let Some(name) = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            log::debug!("Skipping external id {}: record has no name", external_id);
            return Ok(ReconcileOutcome::Skipped(SkipReason::MissingName));
        };

        let mut game_id = None;
        let fail = |game_id: Option<i64>, source: OperationError| {
            log::error!(
                "Reconciliation of external id {} failed (game {}): {}",
                external_id,
                game_label(&game_id),
                source
            );
            ReconcileError::Persistence {
                external_id,
                game_id,
                source,
            }
        };

        if let Err(e) = self.conn.execute_batch("BEGIN IMMEDIATE") {
            return Err(fail(None, e.into()));
        }

        let result = self.write(record, name, acting_user, &mut game_id);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                return Err(fail(game_id, e));
            }
        };
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(fail(game_id, e.into()));
        }

        log::info!(
            "External id {} {} game {} ({} change(s))",
            external_id,
            outcome.label(),
            game_label(&outcome.game_id()),
            outcome.changes().len()
        );
        Ok(outcome)
    }

    /// Match and write. Runs inside the caller's transaction.
    fn write(
        &self,
        record: &ProviderRecord,
        name: &str,
        acting_user: Option<i64>,
        game_id: &mut Option<i64>,
    ) -> Result<ReconcileOutcome, OperationError> {
        let conn = self.conn;
        let external_id = record.external_id;

        let matched = if let Some(game) = queries::find_game_by_external_id(conn, external_id)? {
            Match::ByExternalId(game)
        } else {
            match queries::find_game_by_name(conn, name)? {
                Some(game) if game.external_id.is_none() => Match::ByName(game),
                Some(game) => {
                    log::debug!(
                        "Name '{}' already belongs to game {} with external id {:?}; creating a new game",
                        name,
                        game.id,
                        game.external_id
                    );
                    Match::New
                }
                None => Match::New,
            }
        };

        let entities = EntityResolver::new(conn, self.aliases)
            .resolve(record)
            .map_err(|ResolveError::Db(e)| e)?;

        match matched {
            Match::ByExternalId(game) => {
                *game_id = Some(game.id);
                let changes = self.merge_into(&game, record, &entities, false, acting_user)?;
                Ok(ReconcileOutcome::UpdatedByExternalId {
                    game_id: game.id,
                    changes,
                })
            }
            Match::ByName(game) => {
                *game_id = Some(game.id);
                let changes = self.merge_into(&game, record, &entities, true, acting_user)?;
                Ok(ReconcileOutcome::UpdatedByName {
                    game_id: game.id,
                    changes,
                })
            }
            Match::New => {
                let (id, changes) = self.create(record, name, &entities, acting_user, game_id)?;
                Ok(ReconcileOutcome::Created {
                    game_id: id,
                    changes,
                })
            }
        }
    }

    // ── Create ──────────────────────────────────────────────────────────────

    fn create(
        &self,
        record: &ProviderRecord,
        name: &str,
        entities: &ResolvedEntities,
        acting_user: Option<i64>,
        game_id: &mut Option<i64>,
    ) -> Result<(i64, Vec<String>), OperationError> {
        let conn = self.conn;

        // (studio_id, name) is unique among live games
        let studio_id = match entities.studio_id {
            Some(studio_id) if queries::studio_has_game_named(conn, studio_id, name)? => {
                log::debug!(
                    "Studio {} already has a game named '{}'; creating without a studio",
                    studio_id,
                    name
                );
                None
            }
            other => other,
        };

        let status = merge::promote_status(GameStatus::Pending, None, acting_user);
        let new_game = NewGame {
            external_id: Some(record.external_id),
            name: name.to_string(),
            studio_id,
            cover_url: record.cover_url.clone(),
            age_rating: record.age_rating.clone(),
            description: record.description.clone(),
            metascore: record.metascore,
            user_score: record.user_score,
            status: status.status.unwrap_or_default(),
            released_by: status.released_by,
        };
        let id = operations::insert_game(conn, &new_game)?;
        *game_id = Some(id);

        let mut changes = created_fields(&new_game);
        self.fill_collections(id, record, entities, &mut changes)?;
        Ok((id, changes))
    }

    // ── Merge ───────────────────────────────────────────────────────────────

    fn merge_into(
        &self,
        game: &Game,
        record: &ProviderRecord,
        entities: &ResolvedEntities,
        attach_external_id: bool,
        acting_user: Option<i64>,
    ) -> Result<Vec<String>, OperationError> {
        let conn = self.conn;

        let incoming = IncomingFields {
            studio_id: entities.studio_id,
            cover_url: record.cover_url.clone(),
            age_rating: record.age_rating.clone(),
            description: record.description.clone(),
            metascore: record.metascore,
            user_score: record.user_score,
        };
        let mut patch = merge::plan_field_patch(game, &incoming);
        if let Some(studio_id) = patch.studio_id {
            if queries::studio_has_game_named(conn, studio_id, &game.name)? {
                log::debug!(
                    "Studio {} already has a game named '{}'; leaving game {} without a studio",
                    studio_id,
                    game.name,
                    game.id
                );
                patch.studio_id = None;
            }
        }
        if attach_external_id {
            patch.external_id = Some(record.external_id);
        }

        let mut collection_changes = Vec::new();
        self.fill_collections(game.id, record, entities, &mut collection_changes)?;

        if !patch.is_empty() || !collection_changes.is_empty() {
            merge::apply_status(
                &mut patch,
                merge::promote_status(game.status, game.released_by, acting_user),
            );
        }

        operations::update_game(conn, game.id, &patch)?;

        let mut changes: Vec<String> = patch
            .changed_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        changes.extend(collection_changes);
        Ok(changes)
    }

    /// Attach tags, platforms and images to collections that are still
    /// empty, and fill missing release dates on existing platform links.
    fn fill_collections(
        &self,
        game_id: i64,
        record: &ProviderRecord,
        entities: &ResolvedEntities,
        changes: &mut Vec<String>,
    ) -> Result<(), OperationError> {
        let conn = self.conn;

        let local_tags = queries::tags_for_game(conn, game_id)?;
        if merge::merge_collection(local_tags.len()) == CollectionMerge::AttachAll
            && operations::attach_tags(conn, game_id, &entities.tag_ids)? > 0
        {
            changes.push("tags".to_string());
        }

        let local_platforms = queries::platforms_for_game(conn, game_id)?;
        match merge::merge_collection(local_platforms.len()) {
            CollectionMerge::AttachAll => {
                let mut attached = false;
                for platform in &entities.platforms {
                    let date = platform.release_date.map(format_date);
                    attached |= operations::attach_platform(
                        conn,
                        game_id,
                        platform.platform_id,
                        date.as_deref(),
                    )?;
                }
                if attached {
                    changes.push("platforms".to_string());
                }
            }
            CollectionMerge::Leave => {
                let mut filled = false;
                for platform in &entities.platforms {
                    let Some(date) = platform.release_date else {
                        continue;
                    };
                    let missing_date = local_platforms
                        .iter()
                        .any(|p| p.platform.id == platform.platform_id && p.release_date.is_none());
                    if missing_date {
                        filled |= operations::fill_platform_release_date(
                            conn,
                            game_id,
                            platform.platform_id,
                            &format_date(date),
                        )?;
                    }
                }
                if filled {
                    changes.push("platform_release_dates".to_string());
                }
            }
        }

        let local_images = queries::images_for_game(conn, game_id)?;
        if merge::merge_collection(local_images.len()) == CollectionMerge::AttachAll
            && !record.screenshots.is_empty()
        {
            for (i, url) in record.screenshots.iter().enumerate() {
                operations::insert_game_image(conn, game_id, url, i as i64)?;
            }
            changes.push("images".to_string());
        }

        Ok(())
    }
}

/// Run a batch of reconciliations in order, collecting per-id results.
pub async fn reconcile_many<S: RecordSource>(
    engine: &ReconciliationEngine<'_, S>,
    external_ids: &[i64],
    acting_user: Option<i64>,
    progress: &dyn ReconcileProgress,
) -> (Vec<(i64, Result<ReconcileOutcome, ReconcileError>)>, ReconcileStats) {
    let mut stats = ReconcileStats::default();
    let mut results = Vec::with_capacity(external_ids.len());
    let total = external_ids.len();

    progress.on_phase(&format!("Reconciling {} external id(s)", total));
    for (i, &external_id) in external_ids.iter().enumerate() {
        let result = engine.reconcile(external_id, acting_user).await;
        stats.record(&result);
        progress.on_item(i + 1, total, external_id, &result);
        results.push((external_id, result));
    }
    progress.on_complete(&format!(
        "Done: {} created, {} updated by external id, {} updated by name, {} skipped, {} failed",
        stats.created,
        stats.updated_by_external_id,
        stats.updated_by_name,
        stats.skipped,
        stats.failed
    ));

    (results, stats)
}

fn created_fields(game: &NewGame) -> Vec<String> {
    let mut fields = vec!["external_id", "name"];
    let present = [
        ("studio_id", game.studio_id.is_some()),
        ("cover_url", game.cover_url.is_some()),
        ("age_rating", game.age_rating.is_some()),
        ("description", game.description.is_some()),
        ("metascore", game.metascore.is_some()),
        ("user_score", game.user_score.is_some()),
        ("status", game.status != GameStatus::Pending),
        ("released_by", game.released_by.is_some()),
    ];
    fields.extend(present.iter().filter(|(_, set)| *set).map(|(f, _)| *f));
    fields.into_iter().map(str::to_string).collect()
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
