//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Gateway connections by state
//! - Messages created by path (realtime, http)
//! - Gateway pushes by event and outcome
//! - Database query duration histograms

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("marketplace_chat"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("marketplace_chat")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Open gateway connections
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "websocket_connections_active",
            "Number of open gateway connections",
        )
        .namespace("marketplace_chat"),
        &["state"], // "connected", "authenticated"
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Messages written to the store
pub static MESSAGES_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_created_total", "Messages written to the store")
            .namespace("marketplace_chat"),
        &["path"], // "realtime", "http"
    )
    .expect("Failed to create MESSAGES_CREATED_TOTAL metric")
});

/// Gateway pushes to recipients other than the triggering connection
pub static PUSH_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("push_events_total", "Gateway pushes by event and outcome")
            .namespace("marketplace_chat"),
        &["event", "outcome"], // outcome: "delivered", "offline"
    )
    .expect("Failed to create PUSH_EVENTS_TOTAL metric")
});

/// Database query duration histogram
pub static DB_QUERY_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];
    HistogramVec::new(
        HistogramOpts::new(
            "db_query_duration_seconds",
            "Database query latency in seconds",
        )
        .namespace("marketplace_chat")
        .buckets(buckets),
        &["operation", "table"],
    )
    .expect("Failed to create DB_QUERY_DURATION_SECONDS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(MESSAGES_CREATED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_CREATED_TOTAL");
    registry
        .register(Box::new(PUSH_EVENTS_TOTAL.clone()))
        .expect("Failed to register PUSH_EVENTS_TOTAL");
    registry
        .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
        .expect("Failed to register DB_QUERY_DURATION_SECONDS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record database query metrics
pub fn record_db_query(operation: &str, table: &str, duration_secs: f64) {
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(duration_secs);
}

/// A gateway connection was opened (`+1`) or closed (`-1`) in `state`.
pub fn track_connection(state: &str, delta: i64) {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&[state])
        .add(delta);
}

/// A message was written through `path` ("realtime" or "http").
pub fn record_message_created(path: &str) {
    MESSAGES_CREATED_TOTAL.with_label_values(&[path]).inc();
}

/// A push of `event` was attempted; `delivered` is false when the target was offline.
pub fn record_push(event: &str, delivered: bool) {
    let outcome = if delivered { "delivered" } else { "offline" };
    PUSH_EVENTS_TOTAL.with_label_values(&[event, outcome]).inc();
}

/// Measures one database query.
///
/// Records when observed or dropped, so queries that bail out with `?` are
/// timed as well.
pub struct DbTimer {
    operation: &'static str,
    table: &'static str,
    started: Instant,
}

impl DbTimer {
    pub fn start(operation: &'static str, table: &'static str) -> Self {
        Self {
            operation,
            table,
            started: Instant::now(),
        }
    }

    pub fn observe(self) {
        drop(self);
    }
}

impl Drop for DbTimer {
    fn drop(&mut self) {
        record_db_query(self.operation, self.table, self.started.elapsed().as_secs_f64());
    }
}
