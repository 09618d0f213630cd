//! Temporary file-backed token store.
//!
//! In-memory SQLite databases are private to one connection, so tests that
//! need several pooled connections (concurrency tests, a spawned server plus
//! direct assertions) use a uniquely named file in the system temp
//! directory instead.

use common::config::DatabaseConfig;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use token_service::db;
use uuid::Uuid;

/// Pool size used for test databases.
pub const TEST_MAX_CONNECTIONS: u32 = 8;

pub struct TestDatabase {
    path: PathBuf,
    config: DatabaseConfig,
    pool: SqlitePool,
}

impl TestDatabase {
    /// Create a new empty token store with the schema in place.
    pub async fn new() -> Result<Self, anyhow::Error> {
        let path = std::env::temp_dir().join(format!("token-test-{}.db", Uuid::new_v4()));
        let config = DatabaseConfig {
            max_connections: TEST_MAX_CONNECTIONS,
            ..DatabaseConfig::with_url(format!("sqlite://{}", path.display()))
        };

        let pool = db::connect(&config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open test database: {:?}", e))?;

        Ok(Self { path, config, pool })
    }

    /// Get reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Connection settings pointing at this database
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// URL of the database file
    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Open connections keep the inode alive on unix; the name goes now.
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("db-journal"));
    }
}
