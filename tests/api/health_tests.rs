//! Health Check API Tests

use axum::http::{header, HeaderValue, Method, StatusCode};
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let response = app.server.get("/health/live").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_store_and_connections() {
    let app = TestApp::new();
    let (_session, _rx) = app.connect(4).await;

    let response = app.server.get("/health/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["websocket"]["active_connections"], 1);
}

#[tokio::test]
async fn test_readiness_fails_when_store_unavailable() {
    let app = TestApp::new();
    app.repo.set_unavailable(true);

    let response = app.server.get("/health/ready").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["message_store"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_prometheus_text() {
    let app = TestApp::new();
    app.server.get("/health").await.assert_status_ok();

    let response = app.server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.text().contains("marketplace_chat_http_requests_total"));
}

#[tokio::test]
async fn test_cors_preflight_passes_through_middleware_stack() {
    let app = TestApp::new();

    let response = app
        .server
        .method(Method::OPTIONS, "/api/v1/messages")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
        .add_header(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        HeaderValue::from_static("*")
    );
}

#[tokio::test]
async fn test_simple_request_carries_cors_header() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/health")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
        .await;

    response.assert_status_ok();
    assert!(response
        .maybe_header(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_some());
}
