//! HTTP middleware for the token service.
//!
//! # Components
//!
//! - `api_key` - Static API key check for `/api/v1` routes
//! - `token_guard` - Consumes the presented token and records the resource
//! - `http_metrics` - HTTP request metrics middleware

pub mod api_key;
pub mod http_metrics;
pub mod token_guard;

pub use api_key::require_api_key;
pub use http_metrics::http_metrics_middleware;
pub use token_guard::{require_token, AuthenticatedResource};

use axum::extract::{Query, Request};
use std::collections::HashMap;

/// Read a credential from the named header, falling back to the named query
/// parameter. Empty values count as absent.
pub(crate) fn read_credential(req: &Request, header_name: &str, parameter_name: &str) -> Option<String> {
    let from_header = req
        .headers()
        .get(header_name)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        Query::<HashMap<String, String>>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(mut params)| params.remove(parameter_name))
            .filter(|v| !v.is_empty())
    })
}
