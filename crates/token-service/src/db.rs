//! Token store lifecycle: connection pool, SQLite tuning, schema bootstrap.
//!
//! The pool is opened once at startup, shared by cloning (a `SqlitePool` is
//! a handle), and closed explicitly during shutdown.

use crate::errors::TokenError;
use common::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Open the pool and make sure the token table exists.
///
/// The journal is kept in memory and temporary tables never touch disk, so
/// short token writes do not hold file locks longer than needed. Writers
/// that still collide wait up to the configured busy timeout.
#[instrument(skip_all, name = "token.db.connect")]
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, TokenError> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| TokenError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Memory)
        .pragma("temp_store", "MEMORY")
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await
        .map_err(|e| TokenError::Database(format!("Failed to connect to database: {}", e)))?;

    bootstrap(&pool).await?;

    info!(
        target: "token.db",
        max_connections = config.max_connections,
        "Token store ready"
    );

    Ok(pool)
}

/// Create the token table and its indexes if absent.
///
/// Idempotent; safe to run from several processes or tasks at once.
pub async fn bootstrap(pool: &SqlitePool) -> Result<(), TokenError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS token (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id TEXT NOT NULL,
            value TEXT NOT NULL,
            expiration TEXT NOT NULL
        )
        "#,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS token_resource_id_unique
        ON token (resource_id)
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS token_expiration_idx
        ON token (expiration)
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| TokenError::Database(format!("Failed to bootstrap schema: {}", e)))?;
    }

    Ok(())
}

/// Close every pooled connection. Pending acquires fail after this.
pub async fn shutdown(pool: &SqlitePool) {
    pool.close().await;
    info!(target: "token.db", "Token store closed");
}

/// Single-connection in-memory pool with the schema in place.
///
/// Each in-memory SQLite connection is its own database, so the pool is
/// pinned to one connection that never expires.
#[cfg(test)]
pub(crate) async fn memory_pool() -> Result<SqlitePool, TokenError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| TokenError::Database(e.to_string()))?;
    bootstrap(&pool).await?;
    Ok(pool)
}
