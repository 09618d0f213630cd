//! Login, current-resource and logout handlers.
//!
//! Every success response uses the envelope `{"result": "success", ...}`.
//! When the request belongs to an authenticated resource, a freshly issued
//! token is attached under the configured token field so the client can
//! make its next call.

use crate::errors::{ApiError, TokenError};
use crate::middleware::AuthenticatedResource;
use crate::models::LoginRequest;
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use common::secret::ExposeSecret;
use common::types::ResourceId;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Build the success envelope around `data`, attaching a new token for
/// `resource` when present and tokens are enabled.
///
/// A failure to issue the token goes through the same disclosure policy
/// as a rejected token.
pub(crate) async fn success_response(
    state: &AppState,
    resource: Option<&ResourceId>,
    data: Map<String, Value>,
) -> Result<Response, ApiError> {
    let mut body = Map::new();
    body.insert("result".to_string(), Value::from("success"));
    body.extend(data);

    if let Some(resource_id) = resource.filter(|_| state.config.token.enabled) {
        let token = state
            .tokens
            .issue(resource_id)
            .await
            .map_err(|e| token_failure(state, e))?;
        body.insert(
            state.config.token.parameter_name.clone(),
            Value::from(token.expose_secret()),
        );
    }

    Ok(Json(Value::Object(body)).into_response())
}

fn token_failure(state: &AppState, err: TokenError) -> ApiError {
    ApiError::from_token_error(err, state.config.token.forbidden_on_error)
}

/// Handler for POST {login_route}
///
/// Issues the first token for a resource. The caller is trusted to have
/// authenticated the resource by other means (the API key, a fronting
/// proxy).
#[instrument(skip_all, name = "token.session.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut data = Map::new();
    data.insert(
        "resource_id".to_string(),
        Value::from(request.resource_id.as_str()),
    );

    success_response(&state, Some(&request.resource_id), data).await
}

/// Handler for GET /api/v1/me
///
/// Returns the resource the presented token belonged to, with a rolling
/// replacement token.
#[instrument(skip_all, name = "token.session.me")]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    resource: Option<Extension<AuthenticatedResource>>,
) -> Result<Response, ApiError> {
    let resource = resource.map(|Extension(AuthenticatedResource(id))| id);

    let mut data = Map::new();
    if let Some(ref id) = resource {
        data.insert("resource_id".to_string(), Value::from(id.as_str()));
    }

    success_response(&state, resource.as_ref(), data).await
}

/// Handler for POST /api/v1/logout
///
/// The guard already consumed the presented token; this also drops any
/// other token the resource may hold and deliberately issues no new one.
#[instrument(skip_all, name = "token.session.logout")]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    resource: Option<Extension<AuthenticatedResource>>,
) -> Result<Response, ApiError> {
    let mut data = Map::new();

    if let Some(Extension(AuthenticatedResource(id))) = resource {
        let revoked = state
            .tokens
            .revoke(&id)
            .await
            .map_err(|e| token_failure(&state, e))?;
        data.insert("revoked".to_string(), Value::from(revoked));
    }

    success_response(&state, None, data).await
}
