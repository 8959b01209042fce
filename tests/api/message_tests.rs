//! Fallback Send API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use marketplace_chat::application::dto::MessageResponse;
use marketplace_chat::presentation::websocket::ServerEvent;

use crate::common::{drain, TestApp};

#[tokio::test]
async fn test_send_creates_message_and_pushes_to_both_sides() {
    let app = TestApp::new();
    let (_buyer, mut buyer_rx) = app.connect(1).await;
    let (_seller, mut seller_rx) = app.connect(2).await;

    let response = app
        .server
        .post("/api/v1/messages")
        .authorization_bearer(app.token(1))
        .json(&json!({"content": "  Hi, is Rex still available?  ", "toUserId": 2, "animalId": 17}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: MessageResponse = response.json();
    assert!(created.id > 0);
    assert_eq!(created.content, "Hi, is Rex still available?");
    assert_eq!((created.from_user_id, created.to_user_id), (1, 2));
    assert_eq!(created.animal_id, Some(17));
    assert!(!created.is_read);

    assert_eq!(
        drain(&mut buyer_rx),
        vec![ServerEvent::MessageReceived {
            message: created.clone(),
            client_message_id: None,
        }]
    );
    assert_eq!(
        drain(&mut seller_rx),
        vec![ServerEvent::NewMessage { message: created }]
    );
}

#[tokio::test]
async fn test_send_to_offline_recipient_still_persists() {
    let app = TestApp::new();

    app.server
        .post("/api/v1/messages")
        .authorization_bearer(app.token(1))
        .json(&json!({"content": "Hello", "toUserId": 9}))
        .await
        .assert_status(StatusCode::CREATED);

    let stored = app.repo.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].recipient_id, 9);
}

#[tokio::test]
async fn test_self_message_rejected_without_write() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/v1/messages")
        .authorization_bearer(app.token(5))
        .json(&json!({"content": "memo", "toUserId": 5}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.repo.all().is_empty());
}

#[tokio::test]
async fn test_blank_content_rejected() {
    let app = TestApp::new();

    for content in ["", "   "] {
        app.server
            .post("/api/v1/messages")
            .authorization_bearer(app.token(1))
            .json(&json!({"content": content, "toUserId": 2}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
    assert!(app.repo.all().is_empty());
}

#[tokio::test]
async fn test_content_limit_applies_to_trimmed_text() {
    let app = TestApp::new();
    let max = app.state.settings.chat.max_content_length;

    let padded = format!("  {}  ", "a".repeat(max));
    app.server
        .post("/api/v1/messages")
        .authorization_bearer(app.token(1))
        .json(&json!({"content": padded, "toUserId": 2}))
        .await
        .assert_status(StatusCode::CREATED);

    app.server
        .post("/api/v1/messages")
        .authorization_bearer(app.token(1))
        .json(&json!({"content": "a".repeat(max + 1), "toUserId": 2}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(app.repo.all().len(), 1);
}

#[tokio::test]
async fn test_message_sent_over_http_shows_up_in_history() {
    let app = TestApp::new();

    let created: MessageResponse = app
        .server
        .post("/api/v1/messages")
        .authorization_bearer(app.token(1))
        .json(&json!({"content": "Hello", "toUserId": 2}))
        .await
        .json();

    let history: marketplace_chat::application::dto::HistoryResponse = app
        .server
        .get("/api/v1/conversation-history/1")
        .authorization_bearer(app.token(2))
        .await
        .json();

    assert_eq!(history.messages, vec![created]);
    assert!(app.repo.all()[0].is_read);
}
