//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, create_cors_layer, create_trace_layer, track_http_metrics,
};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let cors = create_cors_layer(&state.settings.cors);

    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // WebSocket gateway endpoint; authentication happens in-band
        .route("/ws", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Innermost first; CORS ends up outermost
        .layer(middleware::from_fn(track_http_metrics))
        .layer(create_trace_layer())
        .layer(cors)
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes (all protected)
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/conversation-history/{counterparty_id}",
            get(handlers::message::get_conversation_history),
        )
        .route("/conversations", get(handlers::message::list_conversations))
        .route(
            "/conversations/{counterparty_id}/read",
            post(handlers::message::mark_conversation_read),
        )
        .route("/messages", post(handlers::message::send_message))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
