//! Static API key check.
//!
//! When enabled, every `/api/v1` request must carry the configured key in
//! the API key header or query parameter. A missing or wrong key is always
//! answered with a bare 403; the disclosure policy for token errors does not
//! apply here.

use crate::crypto::constant_time_eq;
use crate::errors::ApiError;
use crate::middleware::read_credential;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use common::secret::ExposeSecret;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, name = "token.middleware.api_key")]
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let settings = &state.config.api_key;
    if !settings.enabled {
        return Ok(next.run(req).await);
    }

    let expected = settings.key.as_ref().ok_or_else(|| {
        tracing::error!(target: "token.middleware", "API key check enabled without a key");
        ApiError::Forbidden
    })?;

    let presented = read_credential(&req, &settings.header_name, &settings.parameter_name)
        .ok_or_else(|| {
            tracing::debug!(target: "token.middleware", "Missing API key");
            ApiError::Forbidden
        })?;

    if !constant_time_eq(&presented, expected.expose_secret()) {
        tracing::debug!(target: "token.middleware", "API key mismatch");
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
