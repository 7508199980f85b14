use chrono::NaiveDate;
use playshelf_provider::*;

fn decode(json: &str) -> ProviderRecord {
    let raw: RawGame = serde_json::from_str(json).unwrap();
    ProviderRecord::from_raw(500, raw)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn decodes_full_record() {
    let record = decode(
        r#"{
            "id": 500,
            "name": " Nova ",
            "background_image": "https://img/nova.jpg",
            "released": "2020-01-01",
            "esrb_rating": {"id": 4, "name": "Mature"},
            "description_raw": "Space opera.",
            "metacritic": 87,
            "rating": 4.5,
            "developers": [{"name": "Studio X"}, {"name": "Studio Y"}],
            "genres": [{"name": "RPG", "slug": "role-playing-games-rpg"}],
            "platforms": [{"platform": {"id": 4, "name": "PC"}, "released_at": "2020-02-02"}],
            "short_screenshots": [{"id": 1, "image": "https://img/1.jpg"}]
        }"#,
    );

    assert_eq!(record.external_id, 500);
    assert_eq!(record.name.as_deref(), Some("Nova"));
    assert_eq!(record.cover_url.as_deref(), Some("https://img/nova.jpg"));
    assert_eq!(record.released, Some(date("2020-01-01")));
    assert_eq!(record.age_rating.as_deref(), Some("Mature"));
    assert_eq!(record.description.as_deref(), Some("Space opera."));
    assert_eq!(record.metascore, Some(87));
    assert_eq!(record.user_score, Some(9.0));
    assert_eq!(record.developer.as_deref(), Some("Studio X"));
    assert_eq!(
        record.genres,
        vec![ProviderGenre {
            name: "RPG".to_string(),
            slug: Some("role-playing-games-rpg".to_string()),
        }]
    );
    assert_eq!(
        record.platforms,
        vec![ProviderPlatform {
            external_id: Some(4),
            name: "PC".to_string(),
            released_at: Some(date("2020-02-02")),
        }]
    );
    assert_eq!(record.screenshots, vec!["https://img/1.jpg"]);
}

#[test]
fn empty_object_is_all_none() {
    let record = decode("{}");
    assert_eq!(record, ProviderRecord {
        external_id: 500,
        ..Default::default()
    });
}

#[test]
fn nulls_and_wrong_types_are_tolerated() {
    let record = decode(
        r#"{
            "name": "Nova",
            "metacritic": null,
            "rating": "great",
            "developers": null,
            "genres": "rpg",
            "esrb_rating": null,
            "released": 2020
        }"#,
    );
    assert_eq!(record.name.as_deref(), Some("Nova"));
    assert_eq!(record.metascore, None);
    assert_eq!(record.user_score, None);
    assert_eq!(record.developer, None);
    assert!(record.genres.is_empty());
    assert_eq!(record.age_rating, None);
    assert_eq!(record.released, None);
}

#[test]
fn blank_strings_are_dropped() {
    let record = decode(r#"{"name": "   ", "description_raw": "", "developers": [{"name": " "}]}"#);
    assert_eq!(record.name, None);
    assert_eq!(record.description, None);
    assert_eq!(record.developer, None);
}

#[test]
fn out_of_range_scores_are_dropped() {
    let record = decode(r#"{"metacritic": 130, "rating": 7.5}"#);
    assert_eq!(record.metascore, None);
    assert_eq!(record.user_score, None);

    let record = decode(r#"{"metacritic": 0, "rating": 0}"#);
    assert_eq!(record.metascore, Some(0));
    assert_eq!(record.user_score, Some(0.0));
}

#[test]
fn user_score_is_rounded_to_two_places() {
    assert_eq!(rating_to_user_score(4.5), 9.0);
    assert_eq!(rating_to_user_score(3.333), 6.67);
    assert_eq!(rating_to_user_score(5.0), 10.0);
}

#[test]
fn unparsable_dates_are_none() {
    let record = decode(
        r#"{"released": "2020-13-45", "platforms": [{"platform": {"name": "PC"}, "released_at": "soon"}]}"#,
    );
    assert_eq!(record.released, None);
    assert_eq!(record.platforms[0].released_at, None);
}

#[test]
fn numeric_only_genres_and_platforms_are_discarded() {
    let record = decode(
        r#"{
            "genres": [{"name": "36"}, {"name": "Action", "slug": "action"}],
            "platforms": [{"platform": {"id": 9, "name": "17"}}, {"platform": {"name": "Genesis"}}]
        }"#,
    );
    let genres: Vec<_> = record.genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(genres, vec!["Action"]);
    let platforms: Vec<_> = record.platforms.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(platforms, vec!["Genesis"]);
}

#[test]
fn platform_entries_without_names_are_skipped() {
    let record = decode(r#"{"platforms": [{"released_at": "2020-01-01"}, {"platform": {"id": 4}}]}"#);
    assert!(record.platforms.is_empty());
}

#[test]
fn cover_falls_back_to_additional_image() {
    let record = decode(r#"{"background_image": "", "background_image_additional": "https://img/alt.jpg"}"#);
    assert_eq!(record.cover_url.as_deref(), Some("https://img/alt.jpg"));

    let record = decode(r#"{"background_image": "https://img/main.jpg", "background_image_additional": "https://img/alt.jpg"}"#);
    assert_eq!(record.cover_url.as_deref(), Some("https://img/main.jpg"));
}

#[test]
fn screenshots_are_deduplicated_in_order() {
    let record = decode(
        r#"{"short_screenshots": [
            {"image": "b.jpg"}, {"image": "a.jpg"}, {"image": "b.jpg"}, {"image": ""}, {}
        ]}"#,
    );
    assert_eq!(record.screenshots, vec!["b.jpg", "a.jpg"]);
}

#[test]
fn platform_release_date_falls_back_to_record_date() {
    let record = decode(
        r#"{
            "released": "2020-01-01",
            "platforms": [
                {"platform": {"name": "PC"}},
                {"platform": {"name": "Xbox"}, "released_at": "2021-06-01"}
            ]
        }"#,
    );
    assert_eq!(record.release_date_for(&record.platforms[0]), Some(date("2020-01-01")));
    assert_eq!(record.release_date_for(&record.platforms[1]), Some(date("2021-06-01")));
}
