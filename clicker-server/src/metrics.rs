//! Prometheus metrics for clicker-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

const HTTP_REQUESTS_TOTAL: &str = "clicker_http_requests_total";
const HTTP_REQUEST_DURATION: &str = "clicker_http_request_duration_seconds";
const SESSIONS_ACTIVE: &str = "clicker_sessions_active";
const CLICKS_TOTAL: &str = "clicker_clicks_total";
const PURCHASES_TOTAL: &str = "clicker_upgrade_purchases_total";
const PRESTIGES_TOTAL: &str = "clicker_prestiges_total";
const ACHIEVEMENTS_UNLOCKED_TOTAL: &str = "clicker_achievements_unlocked_total";
const VALIDATION_FAILURES_TOTAL: &str = "clicker_validation_failures_total";
const REJECTED_ACTIONS_TOTAL: &str = "clicker_rejected_actions_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record an HTTP request.
///
/// # Arguments
///
/// * `method` - HTTP method (GET, POST, etc.)
/// * `path` - Matched route template, so ids do not explode label cardinality
/// * `status` - HTTP status code
/// * `duration_secs` - Request duration in seconds
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Middleware that records every request through [`record_http_request`].
pub async fn track_http(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// Update the number of sessions held in the store.
#[allow(clippy::cast_precision_loss)]
pub fn set_sessions(count: usize) {
    gauge!(SESSIONS_ACTIVE).set(count as f64);
}

/// Record accepted manual clicks.
pub fn record_clicks(count: u64) {
    counter!(CLICKS_TOTAL).increment(count);
}

/// Record an upgrade purchase.
///
/// # Arguments
///
/// * `upgrade_id` - Upgrade that gained a level
pub fn record_purchase(upgrade_id: &str) {
    counter!(
        PURCHASES_TOTAL,
        "upgrade" => upgrade_id.to_string()
    )
    .increment(1);
}

/// Record a completed prestige.
pub fn record_prestige() {
    counter!(PRESTIGES_TOTAL).increment(1);
}

/// Record achievements unlocked by one action.
pub fn record_achievements_unlocked(count: usize) {
    if count > 0 {
        counter!(ACHIEVEMENTS_UNLOCKED_TOTAL).increment(count as u64);
    }
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `field` - Input that failed (session_id, upgrade_id, clicks, body)
pub fn record_validation_failure(field: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "field" => field.to_string()
    )
    .increment(1);
}

/// Record an action the engine refused.
///
/// # Arguments
///
/// * `code` - Error code returned to the client
pub fn record_rejection(code: &str) {
    counter!(
        REJECTED_ACTIONS_TOTAL,
        "code" => code.to_string()
    )
    .increment(1);
}
