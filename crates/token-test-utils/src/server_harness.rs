//! Test server harness for E2E testing
//!
//! Provides TestTokenServer for spawning real token service instances in
//! tests.

use crate::test_db::TestDatabase;
use crate::test_ids::TEST_API_KEY;
use chrono::{Duration, Utc};
use common::secret::ExposeSecret;
use common::types::ResourceId;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use token_service::config::Config;
use token_service::observability::metrics::init_metrics_recorder;
use token_service::repositories::tokens;
use token_service::routes::{self, AppState};
use token_service::services::TokenService;
use tokio::task::JoinHandle;

/// Test harness for spawning the token service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_flow() -> Result<()> {
///     let server = TestTokenServer::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/api/v1/login", server.url()))
///         .json(&serde_json::json!({ "resource_id": "alice" }))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTokenServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    _db: TestDatabase,
    _handle: JoinHandle<()>,
}

impl TestTokenServer {
    /// Spawn a server with default settings on its own database.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(&[]).await
    }

    /// Spawn a server with the API key check enabled, using
    /// [`TEST_API_KEY`].
    pub async fn spawn_with_api_key() -> Result<Self, anyhow::Error> {
        Self::spawn_with(&[("API_KEY_ENABLED", "true"), ("API_KEY", TEST_API_KEY)]).await
    }

    /// Spawn a server, overriding configuration variables.
    ///
    /// `DATABASE_URL` and `BIND_ADDRESS` are always set by the harness.
    ///
    /// # Returns
    /// * `Ok(TestTokenServer)` - Running server instance
    /// * `Err(anyhow::Error)` - If configuration or server spawn fails
    pub async fn spawn_with(vars: &[(&str, &str)]) -> Result<Self, anyhow::Error> {
        let db = TestDatabase::new().await?;

        let mut env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env.insert("DATABASE_URL".to_string(), db.url().to_string());
        env.insert("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string());

        let config = Config::from_vars(&env)
            .map_err(|e| anyhow::anyhow!("Invalid test configuration: {}", e))?;

        let state = Arc::new(AppState::new(db.pool().clone(), config));

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            _db: db,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// The token service the server itself uses
    pub fn tokens(&self) -> &TokenService {
        &self.state.tokens
    }

    /// Full URL of the configured login route
    pub fn login_url(&self) -> String {
        format!("{}{}", self.url(), self.state.config.token.login_route)
    }

    /// Log in over HTTP and return the issued token.
    pub async fn login(&self, resource_id: &str) -> Result<String, anyhow::Error> {
        let mut request = reqwest::Client::new()
            .post(self.login_url())
            .json(&serde_json::json!({ "resource_id": resource_id }));

        let api_key = &self.state.config.api_key;
        if let (true, Some(key)) = (api_key.enabled, api_key.key.as_ref()) {
            request = request.header(api_key.header_name.as_str(), key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if !status.is_success() {
            anyhow::bail!("Login failed with {}: {}", status, body);
        }

        body.get(&self.state.config.token.parameter_name)
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Login response has no token: {}", body))
    }

    /// Issue a token directly through the service, bypassing HTTP.
    pub async fn issue_token(&self, resource_id: &str) -> Result<String, anyhow::Error> {
        let resource_id = ResourceId::new(resource_id)?;
        let token = self.state.tokens.issue(&resource_id).await?;
        Ok(token.expose_secret().to_string())
    }

    /// Store a token that expired `expired_seconds_ago` seconds ago and
    /// return its wire form.
    pub async fn create_expired_token(
        &self,
        resource_id: &str,
        expired_seconds_ago: i64,
    ) -> Result<String, anyhow::Error> {
        let value = format!("expired{}", uuid::Uuid::new_v4().simple());
        let expiration = Utc::now() - Duration::seconds(expired_seconds_ago);
        tokens::replace_for_resource(self.pool(), resource_id, &value, expiration).await?;
        Ok(format!("{}|{}", value, resource_id))
    }

    /// Number of stored token records.
    pub async fn token_count(&self) -> Result<i64, anyhow::Error> {
        Ok(tokens::count(self.pool()).await?)
    }
}

impl Drop for TestTokenServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
