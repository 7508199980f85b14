use chrono::NaiveDate;
use playshelf_catalog::{clean_name, is_numeric_only};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Game detail response from `GET /games/{id}`.
///
/// Every field is optional and decoded leniently: a field with an unexpected
/// type decodes as `None` instead of failing the whole record.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawGame {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub background_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub background_image_additional: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub released: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub esrb_rating: Option<RawNamed>,
    #[serde(default, deserialize_with = "lenient")]
    pub description_raw: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metacritic: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub developers: Option<Vec<RawNamed>>,
    #[serde(default, deserialize_with = "lenient")]
    pub genres: Option<Vec<RawGenre>>,
    #[serde(default, deserialize_with = "lenient")]
    pub platforms: Option<Vec<RawPlatformEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_screenshots: Option<Vec<RawScreenshot>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawNamed {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawGenre {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawPlatformEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub platform: Option<RawPlatform>,
    #[serde(default, deserialize_with = "lenient")]
    pub released_at: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawPlatform {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RawScreenshot {
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ── Decoded record ──────────────────────────────────────────────────────────

/// A provider game record with every field already checked for usability.
///
/// Reconciliation code never needs to re-validate anything in here: blank
/// strings are `None`, scores are in range, dates parsed, and numeric-only
/// genre and platform names removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderRecord {
    pub external_id: i64,
    pub name: Option<String>,
    pub cover_url: Option<String>,
    pub released: Option<NaiveDate>,
    pub age_rating: Option<String>,
    pub description: Option<String>,
    /// 0..=100
    pub metascore: Option<i64>,
    /// 0.00..=10.00, converted from the provider's 0..=5 rating.
    pub user_score: Option<f64>,
    pub developer: Option<String>,
    pub genres: Vec<ProviderGenre>,
    pub platforms: Vec<ProviderPlatform>,
    pub screenshots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGenre {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPlatform {
    pub external_id: Option<i64>,
    pub name: String,
    pub released_at: Option<NaiveDate>,
}

impl ProviderRecord {
    /// Decode a raw response into a usable record.
    pub fn from_raw(external_id: i64, raw: RawGame) -> Self {
        let cover_url =
            usable(raw.background_image).or_else(|| usable(raw.background_image_additional));

        let metascore = raw
            .metacritic
            .filter(|m| (0.0..=100.0).contains(m))
            .map(|m| m.round() as i64);

        let user_score = raw
            .rating
            .filter(|r| (0.0..=5.0).contains(r))
            .map(rating_to_user_score);

        let developer = raw
            .developers
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|d| usable(d.name));

        let genres = raw
            .genres
            .unwrap_or_default()
            .into_iter()
            .filter_map(|g| {
                let name = usable(g.name)?;
                if is_numeric_only(&name) {
                    log::debug!("Dropping numeric-only genre '{}' for game {}", name, external_id);
                    return None;
                }
                Some(ProviderGenre {
                    name,
                    slug: usable(g.slug),
                })
            })
            .collect();

        let platforms = raw
            .platforms
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                let platform = entry.platform?;
                let name = usable(platform.name)?;
                if is_numeric_only(&name) {
                    log::debug!("Dropping numeric-only platform '{}' for game {}", name, external_id);
                    return None;
                }
                Some(ProviderPlatform {
                    external_id: platform.id.filter(|id| *id > 0),
                    name,
                    released_at: entry.released_at.as_deref().and_then(parse_date),
                })
            })
            .collect();

        let mut screenshots: Vec<String> = Vec::new();
        for shot in raw.short_screenshots.unwrap_or_default() {
            match usable(shot.image) {
                Some(url) if !screenshots.contains(&url) => screenshots.push(url),
                _ => {}
            }
        }

        Self {
            external_id,
            name: usable(raw.name),
            cover_url,
            released: raw.released.as_deref().and_then(parse_date),
            age_rating: raw.esrb_rating.and_then(|r| usable(r.name)),
            description: usable(raw.description_raw),
            metascore,
            user_score,
            developer,
            genres,
            platforms,
            screenshots,
        }
    }

    /// Release date for a platform entry, falling back to the record's own date.
    pub fn release_date_for(&self, platform: &ProviderPlatform) -> Option<NaiveDate> {
        platform.released_at.or(self.released)
    }
}

/// Convert a 0..=5 provider rating to a 0..=10 user score, rounded to 2 places.
pub fn rating_to_user_score(rating: f64) -> f64 {
    (rating * 2.0 * 100.0).round() / 100.0
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn usable(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(clean_name)
}
