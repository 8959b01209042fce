//! Conversation History and Directory API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use marketplace_chat::application::dto::{HistoryResponse, MarkReadResponse, MessageResponse};
use marketplace_chat::domain::CounterpartyProfile;
use marketplace_chat::presentation::websocket::ServerEvent;

use crate::common::{drain, TestApp};

async fn seed_conversation(app: &TestApp, count: usize) -> Vec<MessageResponse> {
    let mut stored = Vec::with_capacity(count);
    for i in 0..count {
        let (from, to) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
        let message = app.seed(from, to, &format!("message {}", i)).await;
        stored.push(MessageResponse::from(message));
    }
    stored
}

#[tokio::test]
async fn test_first_page_holds_newest_messages_oldest_first() {
    let app = TestApp::new();
    let stored = seed_conversation(&app, 45).await;

    let response = app
        .server
        .get("/api/v1/conversation-history/2")
        .add_query_param("page", 1)
        .add_query_param("limit", 20)
        .authorization_bearer(app.token(1))
        .await;

    response.assert_status_ok();
    let history: HistoryResponse = response.json();
    assert_eq!(history.pagination.page, 1);
    assert_eq!(history.pagination.limit, 20);
    assert_eq!(history.pagination.total, 45);
    assert!(history.pagination.has_more);

    let ids: Vec<i64> = history.messages.iter().map(|m| m.id).collect();
    let expected: Vec<i64> = stored[25..45].iter().map(|m| m.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_last_page_holds_oldest_remainder() {
    let app = TestApp::new();
    let stored = seed_conversation(&app, 45).await;

    let response = app
        .server
        .get("/api/v1/conversation-history/1")
        .add_query_param("page", 3)
        .add_query_param("limit", 20)
        .authorization_bearer(app.token(2))
        .await;

    let history: HistoryResponse = response.json();
    assert!(!history.pagination.has_more);
    let contents: Vec<&str> = history.messages.iter().map(|m| m.content.as_str()).collect();
    let expected: Vec<&str> = stored[0..5].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, expected);
}

#[tokio::test]
async fn test_defaults_and_limit_clamp() {
    let app = TestApp::new();
    seed_conversation(&app, 3).await;

    let defaults: HistoryResponse = app
        .server
        .get("/api/v1/conversation-history/2")
        .authorization_bearer(app.token(1))
        .await
        .json();
    assert_eq!((defaults.pagination.page, defaults.pagination.limit), (1, 20));

    let clamped: HistoryResponse = app
        .server
        .get("/api/v1/conversation-history/2")
        .add_query_param("limit", 500)
        .authorization_bearer(app.token(1))
        .await
        .json();
    assert_eq!(clamped.pagination.limit, 100);
    assert_eq!(clamped.messages.len(), 3);
}

#[tokio::test]
async fn test_invalid_parameters_rejected() {
    let app = TestApp::new();
    let token = app.token(1);

    for (path, query) in [
        ("/api/v1/conversation-history/abc", None),
        ("/api/v1/conversation-history/0", None),
        ("/api/v1/conversation-history/1", None),
        ("/api/v1/conversation-history/2", Some(("page", "0"))),
        ("/api/v1/conversation-history/2", Some(("limit", "-5"))),
        ("/api/v1/conversation-history/2", Some(("limit", "ten"))),
    ] {
        let mut request = app.server.get(path).authorization_bearer(&token);
        if let Some((key, value)) = query {
            request = request.add_query_param(key, value);
        }
        let response = request.await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "{} {:?}",
            path,
            query
        );
    }
}

#[tokio::test]
async fn test_history_marks_read_and_notifies_live_sender() {
    let app = TestApp::new();
    let (_alice, mut alice_rx) = app.connect(1).await;
    app.seed(1, 2, "Is the kitten vaccinated?").await;
    app.seed(1, 2, "And microchipped?").await;

    let first: HistoryResponse = app
        .server
        .get("/api/v1/conversation-history/1")
        .authorization_bearer(app.token(2))
        .await
        .json();

    // The page is read before the flags flip.
    assert!(first.messages.iter().all(|m| !m.is_read));
    assert!(app.repo.all().iter().all(|m| m.is_read));
    assert_eq!(
        drain(&mut alice_rx),
        vec![ServerEvent::MessagesRead { read_by: 2 }]
    );

    // Nothing left to mark, so no second receipt.
    app.server
        .get("/api/v1/conversation-history/1")
        .authorization_bearer(app.token(2))
        .await
        .assert_status_ok();
    assert!(drain(&mut alice_rx).is_empty());
}

#[tokio::test]
async fn test_mark_read_endpoint_is_idempotent() {
    let app = TestApp::new();
    let (_alice, mut alice_rx) = app.connect(1).await;
    app.seed(1, 2, "one").await;
    app.seed(1, 2, "two").await;

    let first: MarkReadResponse = app
        .server
        .post("/api/v1/conversations/1/read")
        .authorization_bearer(app.token(2))
        .await
        .json();
    let second: MarkReadResponse = app
        .server
        .post("/api/v1/conversations/1/read")
        .authorization_bearer(app.token(2))
        .await
        .json();

    assert_eq!((first.updated, second.updated), (2, 0));
    assert_eq!(
        drain(&mut alice_rx),
        vec![ServerEvent::MessagesRead { read_by: 2 }]
    );
}

#[tokio::test]
async fn test_conversation_list_orders_by_recency_with_profiles() {
    let app = TestApp::new();
    app.profiles.insert(
        3,
        CounterpartyProfile {
            display_name: Some("Meadow Farm".into()),
            avatar_url: Some("https://cdn.example.com/meadow.png".into()),
            has_active_listings: true,
        },
    );
    let (_seller, _rx) = app.connect(3).await;

    app.seed(1, 2, "older thread").await;
    app.seed(3, 1, "newer thread").await;
    app.seed(3, 1, "still there?").await;

    let response = app
        .server
        .get("/api/v1/conversations")
        .authorization_bearer(app.token(1))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);

    assert_eq!(list[0]["userId"], 3);
    assert_eq!(list[0]["displayName"], "Meadow Farm");
    assert_eq!(list[0]["hasActiveListings"], true);
    assert_eq!(list[0]["unreadCount"], 2);
    assert_eq!(list[0]["isOnline"], true);

    assert_eq!(list[1]["userId"], 2);
    assert_eq!(list[1]["displayName"], Value::Null);
    assert_eq!(list[1]["hasActiveListings"], false);
    assert_eq!(list[1]["unreadCount"], 0);
    assert_eq!(list[1]["isOnline"], false);
}

#[tokio::test]
async fn test_store_outage_returns_generic_500() {
    let app = TestApp::new();
    app.repo.set_unavailable(true);

    let response = app
        .server
        .get("/api/v1/conversations")
        .authorization_bearer(app.token(1))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Internal server error");
}
