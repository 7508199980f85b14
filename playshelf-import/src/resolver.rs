//! Studio, tag and platform resolution.
//!
//! Turns free-text names from a provider record into local row ids, creating
//! rows when absent. Every create goes through [`find_or_create`], so two
//! resolvers racing on the same name both end up with the winner's row.

use chrono::NaiveDate;
use playshelf_catalog::types::Platform;
use playshelf_catalog::{PlatformAliases, clean_name, is_numeric_only, slugify};
use playshelf_db::operations::{self, OperationError, find_or_create};
use playshelf_provider::{ProviderGenre, ProviderPlatform, ProviderRecord};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

/// A platform to link, with its per-platform release date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatform {
    pub platform_id: i64,
    pub release_date: Option<NaiveDate>,
}

/// Local ids for everything a record refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEntities {
    pub studio_id: Option<i64>,
    pub tag_ids: Vec<i64>,
    pub platforms: Vec<ResolvedPlatform>,
}

/// Resolves provider names against one database connection.
pub struct EntityResolver<'a> {
    conn: &'a Connection,
    aliases: &'a PlatformAliases,
}

impl<'a> EntityResolver<'a> {
    pub fn new(conn: &'a Connection, aliases: &'a PlatformAliases) -> Self {
        Self { conn, aliases }
    }

    /// Resolve the studio, tags and platforms of a record.
    pub fn resolve(&self, record: &ProviderRecord) -> Result<ResolvedEntities, ResolveError> {
        let studio_id = match record.developer.as_deref() {
            Some(name) => self.resolve_studio(name)?,
            None => None,
        };
        let tag_ids = self.resolve_tags(&record.genres)?;

        let mut platforms: Vec<ResolvedPlatform> = Vec::new();
        for entry in &record.platforms {
            let Some(platform_id) = self.resolve_platform(entry)? else {
                continue;
            };
            if platforms.iter().any(|p| p.platform_id == platform_id) {
                continue;
            }
            platforms.push(ResolvedPlatform {
                platform_id,
                release_date: record.release_date_for(entry),
            });
        }

        Ok(ResolvedEntities {
            studio_id,
            tag_ids,
            platforms,
        })
    }

    /// Find or create a studio by case-insensitive name.
    pub fn resolve_studio(&self, name: &str) -> Result<Option<i64>, ResolveError> {
        let Some(name) = clean_name(name) else {
            return Ok(None);
        };
        let (studio, created) = find_or_create(
            self.conn,
            |c| operations::find_studio_by_name(c, &name),
            |c| operations::insert_studio(c, &name),
        )?;
        if created {
            log::debug!("Created studio '{}' ({})", studio.name, studio.id);
        }
        Ok(Some(studio.id))
    }

    /// Find or create tags for a list of genres. Numeric-only names and
    /// names that produce an empty slug are dropped. Ids are unique and in
    /// genre order.
    pub fn resolve_tags(&self, genres: &[ProviderGenre]) -> Result<Vec<i64>, ResolveError> {
        let mut ids = Vec::new();
        for genre in genres {
            let Some(name) = clean_name(&genre.name) else {
                continue;
            };
            if is_numeric_only(&name) {
                log::debug!("Ignoring numeric-only genre '{}'", name);
                continue;
            }
            let slug = genre
                .slug
                .as_deref()
                .map(slugify)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| slugify(&name));
            if slug.is_empty() {
                log::debug!("Ignoring genre '{}' with no usable slug", name);
                continue;
            }

            let (tag, created) = find_or_create(
                self.conn,
                |c| operations::find_tag(c, &slug, &name),
                |c| operations::insert_tag(c, &name, &slug),
            )?;
            if created {
                log::debug!("Created tag '{}' ({})", tag.slug, tag.id);
            }
            if !ids.contains(&tag.id) {
                ids.push(tag.id);
            }
        }
        Ok(ids)
    }

    /// Find or create a platform.
    ///
    /// Matching order: provider id, then the alias-normalized name
    /// (case-insensitive). A platform found by name that has no provider id
    /// gets one recorded when possible. New platforms carry the provider id.
    pub fn resolve_platform(&self, entry: &ProviderPlatform) -> Result<Option<i64>, ResolveError> {
        let Some(raw_name) = clean_name(&entry.name) else {
            return Ok(None);
        };
        if is_numeric_only(&raw_name) {
            log::debug!("Ignoring numeric-only platform '{}'", raw_name);
            return Ok(None);
        }
        let name = self.aliases.normalize(&raw_name).to_string();
        let external_id = entry.external_id;

        let lookup = |c: &Connection| -> Result<Option<Platform>, OperationError> {
            if let Some(ext) = external_id {
                if let Some(found) = operations::find_platform_by_external_id(c, ext)? {
                    return Ok(Some(found));
                }
            }
            operations::find_platform_by_name(c, &name)
        };
        let (platform, created) = find_or_create(self.conn, lookup, |c| {
            operations::insert_platform(c, &name, external_id)
        })?;

        if created {
            log::debug!("Created platform '{}' ({})", platform.name, platform.id);
        } else if platform.external_id.is_none() {
            if let Some(ext) = external_id {
                self.backfill_platform_id(platform.id, ext);
            }
        }
        Ok(Some(platform.id))
    }

    fn backfill_platform_id(&self, platform_id: i64, external_id: i64) {
        match operations::set_platform_external_id(self.conn, platform_id, external_id) {
            Ok(true) => log::debug!(
                "Recorded provider id {} on platform {}",
                external_id,
                platform_id
            ),
            Ok(false) => {}
            Err(e) => log::debug!(
                "Could not record provider id {} on platform {}: {}",
                external_id,
                platform_id,
                e
            ),
        }
    }
}
