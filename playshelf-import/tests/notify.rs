use std::time::Duration;

use playshelf_catalog::NewGame;
use playshelf_db::*;
use playshelf_import::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_with_game() -> (Connection, i64) {
    let conn = open_memory().unwrap();
    let id = operations::insert_game(
        &conn,
        &NewGame {
            external_id: Some(500),
            name: "Nova".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    (conn, id)
}

#[tokio::test]
async fn delivers_envelope_with_api_key() {
    let (conn, id) = catalog_with_game();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/games"))
        .and(header("X-API-KEY", "hook-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier =
        WebhookNotifier::new(Some(&format!("{}/hooks/games", server.uri())), Some("hook-key"));
    assert!(notifier.is_enabled());

    let outcome = notifier.notify(&conn, id).await;
    assert_eq!(outcome, NotifyOutcome::Delivered);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body = String::from_utf8(received[0].body.clone()).unwrap();
    assert_eq!(body, serialize(&conn, id).unwrap().to_json().unwrap());
}

#[tokio::test]
async fn missing_configuration_disables_notifier() {
    let (conn, id) = catalog_with_game();

    for notifier in [
        WebhookNotifier::new(None, Some("key")),
        WebhookNotifier::new(Some("http://127.0.0.1:9"), None),
        WebhookNotifier::new(Some("  "), Some("key")),
    ] {
        assert!(!notifier.is_enabled());
        assert_eq!(notifier.notify(&conn, id).await, NotifyOutcome::Disabled);
    }
}

#[tokio::test]
async fn rejected_delivery_is_reported_not_raised() {
    let (conn, id) = catalog_with_game();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error": "boom"}"#))
        .expect(1)
        .mount(&server)
        .await;
    let notifier = WebhookNotifier::new(Some(&server.uri()), Some("hook-key"));

    match notifier.notify(&conn, id).await {
        NotifyOutcome::Failed(reason) => assert!(reason.contains("500")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let (conn, id) = catalog_with_game();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let notifier = WebhookNotifier::with_timeout(
        Some(&server.uri()),
        Some("hook-key"),
        Duration::from_millis(200),
    );

    assert_eq!(
        notifier.notify(&conn, id).await,
        NotifyOutcome::Failed("request timed out".to_string())
    );
}

#[tokio::test]
async fn unknown_game_is_a_failed_notification() {
    let conn = open_memory().unwrap();
    let notifier = WebhookNotifier::new(Some("http://127.0.0.1:9"), Some("hook-key"));
    assert!(matches!(
        notifier.notify(&conn, 42).await,
        NotifyOutcome::Failed(_)
    ));
}
