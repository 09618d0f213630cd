//! Metrics definitions for the token service
//!
//! All metrics follow Prometheus naming conventions:
//! - `token_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `status`: 2 values (success, error)
//! - `error_kind`: 7 values (see `TokenError::kind`) plus `none`
//! - `path`: known routes, everything else collapses to `other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// # Errors
///
/// Returns error if the recorder cannot be installed (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("token_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Issuance is one transaction against a local SQLite file
        .set_buckets_for_metric(
            Matcher::Prefix("token_issuance".to_string()),
            &[0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `token_issuance_duration_seconds`, `token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token consumption result
///
/// Metric: `token_consumption_total`
/// Labels: `status`, `error_kind`
pub fn record_token_consumption(status: &str, error_kind: Option<&str>) {
    let kind = error_kind.unwrap_or("none");
    counter!("token_consumption_total", "status" => status.to_string(), "error_kind" => kind.to_string())
        .increment(1);
}

/// Record expired records removed by the cleanup task
///
/// Metric: `token_expired_purged_total`
pub fn record_expired_purged(count: u64) {
    counter!("token_expired_purged_total").increment(count);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `token_http_requests_total`, `token_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Requests to `login_route` are labelled `login` whatever path it is
/// configured at.
pub fn record_http_request(
    method: &str,
    path: &str,
    login_route: &str,
    status_code: u16,
    duration: Duration,
) {
    let normalized_path = normalize_path(path, login_route);

    histogram!("token_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("token_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Collapse unknown paths so scanners cannot create unbounded label values.
fn normalize_path(path: &str, login_route: &str) -> String {
    match path {
        p if p == login_route => "login".to_string(),
        "/health" | "/ready" | "/metrics" | "/api/v1/me" | "/api/v1/logout" => path.to_string(),
        p if p.starts_with("/api/v1/") => "/api/v1/other".to_string(),
        _ => "other".to_string(),
    }
}
