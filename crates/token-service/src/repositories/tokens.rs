//! Token repository module for database operations.
//!
//! One row per resource identifier. Expirations are stored as fixed-width
//! RFC 3339 UTC strings (microsecond precision, `Z` suffix) so that string
//! comparison in SQL orders them chronologically.

use crate::errors::TokenError;
use crate::models::TokenRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

/// Canonical text form of a timestamp in the token table.
pub fn format_expiration(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Replace whatever token a resource has with a new one.
///
/// The delete and the insert share one transaction. Because the delete is
/// the first statement, the transaction takes the write lock up front and a
/// concurrent replacement for the same resource waits for it to commit.
pub async fn replace_for_resource(
    pool: &SqlitePool,
    resource_id: &str,
    value: &str,
    expiration: DateTime<Utc>,
) -> Result<TokenRecord, TokenError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| TokenError::Database(format!("Failed to begin transaction: {}", e)))?;

    sqlx::query(
        r#"
        DELETE FROM token
        WHERE resource_id = ?1
        "#,
    )
    .bind(resource_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| TokenError::Database(format!("Failed to delete previous token: {}", e)))?;

    let record = sqlx::query_as::<_, TokenRecord>(
        r#"
        INSERT INTO token (resource_id, value, expiration)
        VALUES (?1, ?2, ?3)
        RETURNING id, resource_id, value, expiration
        "#,
    )
    .bind(resource_id)
    .bind(value)
    .bind(format_expiration(expiration))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| TokenError::Database(format!("Failed to insert token: {}", e)))?;

    tx.commit()
        .await
        .map_err(|e| TokenError::Database(format!("Failed to commit token: {}", e)))?;

    Ok(record)
}

/// Get the token record for a resource, if any.
pub async fn get_by_resource_id(
    pool: &SqlitePool,
    resource_id: &str,
) -> Result<Option<TokenRecord>, TokenError> {
    let record = sqlx::query_as::<_, TokenRecord>(
        r#"
        SELECT id, resource_id, value, expiration
        FROM token
        WHERE resource_id = ?1
        "#,
    )
    .bind(resource_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| TokenError::Database(format!("Failed to fetch token: {}", e)))?;

    Ok(record)
}

/// Delete exactly the given row, provided it still holds `value`.
///
/// Returns `true` only for the caller whose statement removed the row. A
/// concurrent consumer, or a re-issue that replaced the row, makes this
/// return `false`.
pub async fn delete_record(pool: &SqlitePool, id: i64, value: &str) -> Result<bool, TokenError> {
    let result = sqlx::query(
        r#"
        DELETE FROM token
        WHERE id = ?1 AND value = ?2
        "#,
    )
    .bind(id)
    .bind(value)
    .execute(pool)
    .await
    .map_err(|e| TokenError::Database(format!("Failed to delete token: {}", e)))?;

    Ok(result.rows_affected() == 1)
}

/// Delete any token held by a resource.
///
/// Returns whether a row was removed.
pub async fn delete_by_resource_id(pool: &SqlitePool, resource_id: &str) -> Result<bool, TokenError> {
    let result = sqlx::query(
        r#"
        DELETE FROM token
        WHERE resource_id = ?1
        "#,
    )
    .bind(resource_id)
    .execute(pool)
    .await
    .map_err(|e| TokenError::Database(format!("Failed to delete token by resource: {}", e)))?;

    Ok(result.rows_affected() > 0)
}

/// Delete every token whose expiration is at or before `now`.
///
/// Returns the number of rows removed.
pub async fn delete_expired(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, TokenError> {
    let result = sqlx::query(
        r#"
        DELETE FROM token
        WHERE expiration <= ?1
        "#,
    )
    .bind(format_expiration(now))
    .execute(pool)
    .await
    .map_err(|e| TokenError::Database(format!("Failed to delete expired tokens: {}", e)))?;

    Ok(result.rows_affected())
}

/// Count stored tokens.
pub async fn count(pool: &SqlitePool) -> Result<i64, TokenError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM token")
        .fetch_one(pool)
        .await
        .map_err(|e| TokenError::Database(format!("Failed to count tokens: {}", e)))?;

    Ok(count)
}
