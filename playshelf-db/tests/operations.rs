use std::cell::Cell;

use playshelf_catalog::types::*;
use playshelf_db::*;

fn new_game(name: &str) -> NewGame {
    NewGame {
        name: name.to_string(),
        ..Default::default()
    }
}

#[test]
fn studio_lookup_is_case_insensitive() {
    let conn = open_memory().unwrap();
    let created = insert_studio(&conn, "Studio X").unwrap();

    let found = find_studio_by_name(&conn, "studio x").unwrap();
    assert_eq!(found, Some(created));

    assert_eq!(find_studio_by_name(&conn, "Studio Y").unwrap(), None);
}

#[test]
fn duplicate_studio_insert_is_unique_violation() {
    let conn = open_memory().unwrap();
    insert_studio(&conn, "Studio X").unwrap();
    let err = insert_studio(&conn, "Studio X").unwrap_err();
    assert!(err.is_unique_violation());
}

#[test]
fn studio_lookup_folds_accented_letters() {
    let conn = open_memory().unwrap();
    let created = insert_studio(&conn, "ÉLAN").unwrap();

    assert_eq!(find_studio_by_name(&conn, "élan").unwrap(), Some(created));
    assert_eq!(find_studio_by_name(&conn, "elan").unwrap(), None);
}

#[test]
fn studio_names_differing_only_in_case_collide() {
    let conn = open_memory().unwrap();
    insert_studio(&conn, "Ébène Studio").unwrap();
    let err = insert_studio(&conn, "ÉBÈNE STUDIO").unwrap_err();
    assert!(err.is_unique_violation());
}

#[test]
fn find_or_create_creates_once() {
    let conn = open_memory().unwrap();
    let (first, created) = find_or_create(
        &conn,
        |c| find_studio_by_name(c, "Nova Games"),
        |c| insert_studio(c, "Nova Games"),
    )
    .unwrap();
    assert!(created);

    let (second, created) = find_or_create(
        &conn,
        |c| find_studio_by_name(c, "NOVA GAMES"),
        |c| insert_studio(c, "NOVA GAMES"),
    )
    .unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);
}

#[test]
fn find_or_create_recovers_from_lost_race() {
    let conn = open_memory().unwrap();
    // Another writer got there first...
    let winner = insert_studio(&conn, "Studio X").unwrap();

    // ...but our first lookup ran before that commit and saw nothing.
    let lookups = Cell::new(0);
    let (studio, created) = find_or_create(
        &conn,
        |c| {
            lookups.set(lookups.get() + 1);
            if lookups.get() == 1 {
                Ok(None)
            } else {
                find_studio_by_name(c, "Studio X")
            }
        },
        |c| insert_studio(c, "Studio X"),
    )
    .unwrap();

    assert!(!created);
    assert_eq!(studio, winner);
    assert_eq!(lookups.get(), 2);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM studios", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn find_or_create_inside_transaction_keeps_outer_work() {
    let conn = open_memory().unwrap();
    insert_tag(&conn, "RPG", "rpg").unwrap();

    conn.execute_batch("BEGIN IMMEDIATE").unwrap();
    let game_id = insert_game(&conn, &new_game("Nova")).unwrap();
    let lookups = Cell::new(0);
    let (tag, created) = find_or_create(
        &conn,
        |c| {
            lookups.set(lookups.get() + 1);
            if lookups.get() == 1 {
                Ok(None)
            } else {
                find_tag(c, "rpg", "RPG")
            }
        },
        |c| insert_tag(c, "RPG", "rpg"),
    )
    .unwrap();
    conn.execute_batch("COMMIT").unwrap();

    assert!(!created);
    assert_eq!(tag.slug, "rpg");
    // The game inserted before the savepoint survived the partial rollback.
    assert!(get_game(&conn, game_id).unwrap().is_some());
}

#[test]
fn find_or_create_propagates_other_errors() {
    let conn = open_memory().unwrap();
    let result = find_or_create(
        &conn,
        |_| Ok::<Option<i64>, OperationError>(None),
        |c| {
            c.execute("INSERT INTO no_such_table VALUES (1)", [])?;
            Ok(1)
        },
    );
    assert!(result.is_err());
}

#[test]
fn tag_matches_by_slug_or_name() {
    let conn = open_memory().unwrap();
    let legacy = insert_tag(&conn, "Role Playing", "role-playing-legacy").unwrap();

    // Slug differs, name matches case-insensitively
    let by_name = find_tag(&conn, "role-playing", "role playing").unwrap();
    assert_eq!(by_name, Some(legacy.clone()));

    let by_slug = find_tag(&conn, "role-playing-legacy", "Something Else").unwrap();
    assert_eq!(by_slug, Some(legacy));

    assert_eq!(find_tag(&conn, "action", "Action").unwrap(), None);
}

#[test]
fn tag_slug_match_wins_over_name_match() {
    let conn = open_memory().unwrap();
    insert_tag(&conn, "Action", "action-old").unwrap();
    let exact = insert_tag(&conn, "Action Games", "action").unwrap();

    let found = find_tag(&conn, "action", "Action").unwrap().unwrap();
    assert_eq!(found.id, exact.id);
}

#[test]
fn platform_lookups_and_backfill() {
    let conn = open_memory().unwrap();
    let pc = insert_platform(&conn, "PC", None).unwrap();

    assert_eq!(find_platform_by_external_id(&conn, 4).unwrap(), None);
    assert_eq!(find_platform_by_name(&conn, "pc").unwrap(), Some(pc.clone()));
    let sega = insert_platform(&conn, "SÉGA CD", None).unwrap();
    assert_eq!(find_platform_by_name(&conn, "séga cd").unwrap(), Some(sega));

    assert!(set_platform_external_id(&conn, pc.id, 4).unwrap());
    // Never overwrites an existing id
    assert!(!set_platform_external_id(&conn, pc.id, 5).unwrap());

    let found = find_platform_by_external_id(&conn, 4).unwrap().unwrap();
    assert_eq!(found.id, pc.id);
    assert_eq!(found.external_id, Some(4));
}

#[test]
fn platform_external_id_is_unique() {
    let conn = open_memory().unwrap();
    insert_platform(&conn, "PC", Some(4)).unwrap();
    let err = insert_platform(&conn, "Windows", Some(4)).unwrap_err();
    assert!(err.is_unique_violation());
}

#[test]
fn insert_and_update_game() {
    let conn = open_memory().unwrap();
    let id = insert_game(
        &conn,
        &NewGame {
            external_id: Some(500),
            name: "Nova".to_string(),
            metascore: Some(80),
            ..Default::default()
        },
    )
    .unwrap();

    let patch = GamePatch {
        cover_url: Some("https://img/nova.jpg".to_string()),
        user_score: Some(9.0),
        status: Some(GameStatus::Released),
        released_by: Some(3),
        ..Default::default()
    };
    update_game(&conn, id, &patch).unwrap();

    let game = get_game(&conn, id).unwrap().unwrap();
    assert_eq!(game.external_id, Some(500));
    assert_eq!(game.metascore, Some(80));
    assert_eq!(game.cover_url.as_deref(), Some("https://img/nova.jpg"));
    assert_eq!(game.user_score, Some(9.0));
    assert_eq!(game.status, GameStatus::Released);
    assert_eq!(game.released_by, Some(3));
    assert_eq!(game.times_updated, 0);
}

#[test]
fn empty_patch_is_noop() {
    let conn = open_memory().unwrap();
    let id = insert_game(&conn, &new_game("Nova")).unwrap();
    conn.execute(
        "UPDATE games SET updated_at = '2000-01-01 00:00:00' WHERE id = ?1",
        [id],
    )
    .unwrap();

    update_game(&conn, id, &GamePatch::default()).unwrap();

    let game = get_game(&conn, id).unwrap().unwrap();
    assert_eq!(game.updated_at, "2000-01-01 00:00:00");
}

#[test]
fn update_missing_game_is_not_found() {
    let conn = open_memory().unwrap();
    let patch = GamePatch {
        description: Some("x".to_string()),
        ..Default::default()
    };
    match update_game(&conn, 42, &patch) {
        Err(OperationError::NotFound { entity_type, .. }) => assert_eq!(entity_type, "game"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn studio_name_uniqueness_ignores_deleted_games() {
    let conn = open_memory().unwrap();
    let studio = insert_studio(&conn, "Studio X").unwrap();
    let game = NewGame {
        name: "Nova".to_string(),
        studio_id: Some(studio.id),
        ..Default::default()
    };
    let first = insert_game(&conn, &game).unwrap();
    assert!(insert_game(&conn, &game).unwrap_err().is_unique_violation());

    soft_delete_game(&conn, first).unwrap();
    insert_game(&conn, &game).unwrap();
}

#[test]
fn pivots_are_idempotent() {
    let conn = open_memory().unwrap();
    let game = insert_game(&conn, &new_game("Nova")).unwrap();
    let rpg = insert_tag(&conn, "RPG", "rpg").unwrap();
    let pc = insert_platform(&conn, "PC", None).unwrap();

    assert_eq!(attach_tags(&conn, game, &[rpg.id]).unwrap(), 1);
    assert_eq!(attach_tags(&conn, game, &[rpg.id]).unwrap(), 0);

    assert!(attach_platform(&conn, game, pc.id, None).unwrap());
    assert!(!attach_platform(&conn, game, pc.id, Some("2020-01-01")).unwrap());

    assert!(fill_platform_release_date(&conn, game, pc.id, "2020-01-01").unwrap());
    assert!(!fill_platform_release_date(&conn, game, pc.id, "2021-05-05").unwrap());

    let platforms = platforms_for_game(&conn, game).unwrap();
    assert_eq!(platforms.len(), 1);
    assert_eq!(platforms[0].release_date.as_deref(), Some("2020-01-01"));
}

#[test]
fn images_keep_sort_order() {
    let conn = open_memory().unwrap();
    let game = insert_game(&conn, &new_game("Nova")).unwrap();
    insert_game_image(&conn, game, "b.jpg", 1).unwrap();
    insert_game_image(&conn, game, "a.jpg", 0).unwrap();

    let urls: Vec<_> = images_for_game(&conn, game)
        .unwrap()
        .into_iter()
        .map(|i| i.url)
        .collect();
    assert_eq!(urls, vec!["a.jpg", "b.jpg"]);
}
