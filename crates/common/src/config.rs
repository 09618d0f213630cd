//! Common configuration types for the resource token workspace.

use serde::{Deserialize, Serialize};

/// Default SQLite database location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://token.db";

/// Default maximum pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time a writer waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT_SECONDS: u64 = 5;

/// Default time to wait for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 5;

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection string (`sqlite://path/to/file.db` or `sqlite::memory:`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Seconds a connection waits on a lock held by another writer
    pub busy_timeout_seconds: u64,
    /// Seconds to wait for a connection from the pool
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_seconds: DEFAULT_BUSY_TIMEOUT_SECONDS,
            acquire_timeout_seconds: DEFAULT_ACQUIRE_TIMEOUT_SECONDS,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for the given URL with default pool settings.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}
