//! WebSocket Transport Tests
//!
//! Drive `/ws` over a real socket, covering the writer task, frame handling
//! and the close transition.

use axum_test::{TestWebSocket, WsMessage};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{eventually, test_settings, TestApp};

async fn open_socket(app: &TestApp) -> TestWebSocket {
    app.server.get_websocket("/ws").await.into_websocket().await
}

async fn authenticate(app: &TestApp, ws: &mut TestWebSocket, user_id: i64) {
    ws.send_json(&json!({"type": "authenticate", "token": app.token(user_id)}))
        .await;
    let reply: Value = ws.receive_json().await;
    assert_eq!(reply, json!({"type": "authenticated", "userId": user_id}));
}

#[tokio::test]
async fn test_abrupt_drop_deregisters_user() {
    let app = TestApp::with_http_transport(test_settings());
    let mut ws = open_socket(&app).await;
    authenticate(&app, &mut ws, 4).await;
    assert!(app.state.gateway.is_online(4));

    ws.send_json(&json!({
        "type": "sendMessage",
        "content": "Still available?",
        "toUserId": 5,
        "clientMessageId": "x"
    }))
    .await;
    let confirmation: Value = ws.receive_json().await;
    assert_eq!(confirmation["type"], "messageReceived");
    assert_eq!(confirmation["clientMessageId"], "x");
    assert_eq!(confirmation["message"]["content"], "Still available?");

    // No close frame; the server only sees the socket go away
    drop(ws);

    assert!(eventually(|| !app.state.gateway.is_online(4)).await);
    assert_eq!(app.state.gateway.connection_count(), 0);
    assert_eq!(app.repo.all().len(), 1);
}

#[tokio::test]
async fn test_live_recipient_receives_new_message_over_socket() {
    let app = TestApp::with_http_transport(test_settings());
    let mut buyer = open_socket(&app).await;
    let mut seller = open_socket(&app).await;
    authenticate(&app, &mut buyer, 1).await;
    authenticate(&app, &mut seller, 2).await;

    buyer
        .send_json(&json!({"type": "sendMessage", "content": "Hello", "toUserId": 2, "animalId": 9}))
        .await;

    let confirmation: Value = buyer.receive_json().await;
    assert_eq!(confirmation["type"], "messageReceived");

    let pushed: Value = seller.receive_json().await;
    assert_eq!(pushed["type"], "newMessage");
    assert_eq!(pushed["message"]["id"], confirmation["message"]["id"]);
    assert_eq!(pushed["message"]["animalId"], 9);

    seller
        .send_json(&json!({"type": "markAsRead", "fromUserId": 1}))
        .await;
    let receipt: Value = buyer.receive_json().await;
    assert_eq!(receipt, json!({"type": "messagesRead", "readBy": 2}));
}

#[tokio::test]
async fn test_binary_frames_are_ignored() {
    let app = TestApp::with_http_transport(test_settings());
    let mut ws = open_socket(&app).await;
    authenticate(&app, &mut ws, 7).await;

    ws.send_message(WsMessage::Binary(vec![0xde, 0xad, 0xbe, 0xef].into()))
        .await;
    ws.send_text("not json").await;

    // The first reply belongs to the text frame; the binary one got none
    let reply: Value = ws.receive_json().await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Invalid event format");
    assert!(app.state.gateway.is_online(7));
}

#[tokio::test]
async fn test_idle_connection_is_closed_and_deregistered() {
    let mut settings = test_settings();
    settings.websocket.idle_timeout_secs = 1;
    let app = TestApp::with_http_transport(settings);

    let mut ws = open_socket(&app).await;
    authenticate(&app, &mut ws, 11).await;
    assert!(app.state.gateway.is_online(11));

    assert!(eventually(|| !app.state.gateway.is_online(11)).await);
    assert_eq!(app.state.gateway.connection_count(), 0);
}
