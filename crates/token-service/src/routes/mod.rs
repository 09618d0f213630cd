//! HTTP routes for the token service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_api_key, require_token};
use crate::services::TokenService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token store pool, shared with `tokens`.
    pub pool: SqlitePool,

    /// Service configuration.
    pub config: Config,

    /// Token issuance and consumption.
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let ttl = chrono::Duration::seconds(config.token.ttl_seconds);
        Self {
            tokens: TokenService::new(pool.clone(), ttl),
            pool,
            config,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe - public, unversioned
/// - `/ready` - Readiness probe (checks the token store) - public, unversioned
/// - `/metrics` - Prometheus metrics endpoint - public, unversioned
/// - `{login_route}` - Issue a token - API key only
/// - `/api/v1/me` - Current resource with rolling token - token required
/// - `/api/v1/logout` - Revoke the resource's tokens - token required
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let mut guarded_routes = Router::new()
        .route("/api/v1/me", get(handlers::get_me))
        .route("/api/v1/logout", post(handlers::logout));

    if state.config.token.enabled {
        guarded_routes = guarded_routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_token,
        ));
    }

    // Route layers apply to routes added before them, so the API key check
    // covers login as well as the guarded routes.
    let login_route: Arc<str> = Arc::from(state.config.token.login_route.as_str());

    let api_routes = Router::new()
        .route(&state.config.token.login_route, post(handlers::login))
        .merge(guarded_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn_with_state(
            login_route,
            http_metrics_middleware,
        ))
}

/// State over a fresh in-memory token store.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) async fn test_state(config: Config) -> Arc<AppState> {
    let pool = crate::db::memory_pool()
        .await
        .expect("in-memory pool should open");
    Arc::new(AppState::new(pool, config))
}
