//! Authentication API Tests

use axum::http::{header, HeaderValue, StatusCode};
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_missing_authorization_header_rejected() {
    let app = TestApp::new();

    let response = app.server.get("/api/v1/conversations").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/v1/conversations")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/v1/conversations")
        .authorization_bearer(app.expired_token(1))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/v1/conversation-history/2")
        .authorization_bearer("not.a.token")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.repo.all().is_empty());
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/v1/conversations")
        .authorization_bearer(app.token(1))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, serde_json::json!([]));
}
