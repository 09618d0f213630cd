//! HTTP metrics middleware.
//!
//! Applied as the outermost layer so that responses produced before any
//! handler runs (404, 405, 415, rejected credentials, timeouts) are counted
//! too.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status and duration of every request.
///
/// The state is the configured login route.
pub async fn http_metrics_middleware(
    State(login_route): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        &login_route,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
