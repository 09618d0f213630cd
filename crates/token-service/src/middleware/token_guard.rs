//! Token guard for protected routes.
//!
//! Reads the token from the configured header (then the configured query
//! parameter), consumes it, and makes the resource it was bound to available
//! to handlers. Because consumption deletes the token, every protected
//! request costs the caller its token; handlers hand out a fresh one in the
//! success envelope.

use crate::errors::ApiError;
use crate::middleware::read_credential;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use common::types::ResourceId;
use std::sync::Arc;
use tracing::instrument;

/// Resource authenticated by the token guard, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedResource(pub ResourceId);

/// Consume the presented token or reject the request.
///
/// # Response
///
/// - Generic 403 on any token failure when `forbidden_on_error` is set
/// - Otherwise the detailed error body with the token error code
/// - Continues with [`AuthenticatedResource`] in extensions on success
#[instrument(skip_all, name = "token.middleware.token_guard")]
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let settings = &state.config.token;
    let raw = read_credential(&req, &settings.header_name, &settings.parameter_name);

    let resource_id = state
        .tokens
        .consume(raw.as_deref())
        .await
        .map_err(|e| ApiError::from_token_error(e, settings.forbidden_on_error))?;

    req.extensions_mut()
        .insert(AuthenticatedResource(resource_id));

    Ok(next.run(req).await)
}
