use crate::crypto;
use crate::errors::TokenError;
use crate::models::{PresentedToken, Token};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{
    record_expired_purged, record_token_consumption, record_token_issuance,
};
use crate::repositories::tokens;
use chrono::{Duration, Utc};
use common::secret::{ExposeSecret, SecretString};
use common::types::ResourceId;
use sqlx::SqlitePool;
use std::time::Instant;
use tracing::instrument;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

/// Issues and consumes single-use tokens bound to resource identifiers.
///
/// Cheap to clone; every clone shares the same pool.
#[derive(Clone)]
pub struct TokenService {
    pool: SqlitePool,
    ttl: Duration,
}

impl TokenService {
    pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Issue a token for `resource_id`, replacing any token it already had.
    ///
    /// Returns the wire form `value|resource_id`.
    #[instrument(
        name = "token.service.issue",
        skip_all,
        fields(resource = %hash_for_correlation(resource_id.as_str()), status)
    )]
    pub async fn issue(&self, resource_id: &ResourceId) -> Result<SecretString, TokenError> {
        let start = Instant::now();
        let result = self.issue_inner(resource_id).await;
        let status = if result.is_ok() { "success" } else { "error" };

        tracing::Span::current().record("status", status);
        record_token_issuance(status, start.elapsed());

        if let Err(ref e) = result {
            tracing::error!(target: "token.service", error = ?e, "Token issuance failed");
        }

        result
    }

    async fn issue_inner(&self, resource_id: &ResourceId) -> Result<SecretString, TokenError> {
        let value = crypto::generate_token_value()?;
        let expiration = Utc::now() + self.ttl;

        tokens::replace_for_resource(
            &self.pool,
            resource_id.as_str(),
            value.expose_secret(),
            expiration,
        )
        .await?;

        tracing::debug!(target: "token.service", %expiration, "Token issued");

        Ok(Token::new(resource_id.clone(), value).serialize())
    }

    /// Validate a presented token and invalidate it.
    ///
    /// On success the record is gone and the resource identifier it was
    /// bound to is returned. Of several concurrent callers presenting the
    /// same token, exactly one succeeds.
    #[instrument(name = "token.service.consume", skip_all, fields(error_kind))]
    pub async fn consume(&self, raw: Option<&str>) -> Result<ResourceId, TokenError> {
        let result = self.consume_inner(raw).await;

        match &result {
            Ok(_) => record_token_consumption("success", None),
            Err(e) => {
                tracing::Span::current().record("error_kind", e.kind());
                record_token_consumption("error", Some(e.kind()));
                if e.is_client_error() {
                    tracing::debug!(target: "token.service", error_kind = e.kind(), "Token rejected");
                } else {
                    tracing::error!(target: "token.service", error = ?e, "Token consumption failed");
                }
            }
        }

        result
    }

    async fn consume_inner(&self, raw: Option<&str>) -> Result<ResourceId, TokenError> {
        let raw = raw.ok_or(TokenError::NotProvided)?;
        let presented = PresentedToken::parse(raw)?;

        let record = tokens::get_by_resource_id(&self.pool, presented.resource_id())
            .await?
            .ok_or(TokenError::ResourceNotFound)?;

        if record.is_expired_at(Utc::now()) {
            // Lazy cleanup; a concurrent purge may already have removed it.
            tokens::delete_record(&self.pool, record.id, &record.value).await?;
            return Err(TokenError::Expired);
        }

        if !crypto::constant_time_eq(presented.value(), &record.value) {
            return Err(TokenError::InvalidValue);
        }

        // Lost the race to another consumer or to a re-issue.
        if !tokens::delete_record(&self.pool, record.id, &record.value).await? {
            return Err(TokenError::ResourceNotFound);
        }

        tracing::debug!(
            target: "token.service",
            resource = %hash_for_correlation(&record.resource_id),
            "Token consumed"
        );

        ResourceId::new(record.resource_id)
            .map_err(|e| TokenError::Database(format!("Stored resource id is invalid: {}", e)))
    }

    /// Remove any token held by `resource_id`.
    ///
    /// Returns whether a token was removed.
    #[instrument(
        name = "token.service.revoke",
        skip_all,
        fields(resource = %hash_for_correlation(resource_id.as_str()))
    )]
    pub async fn revoke(&self, resource_id: &ResourceId) -> Result<bool, TokenError> {
        let removed = tokens::delete_by_resource_id(&self.pool, resource_id.as_str()).await?;
        tracing::debug!(target: "token.service", removed, "Token revoked");
        Ok(removed)
    }

    /// Delete every expired record. Returns the number removed.
    #[instrument(name = "token.service.purge_expired", skip_all)]
    pub async fn purge_expired(&self) -> Result<u64, TokenError> {
        let purged = tokens::delete_expired(&self.pool, Utc::now()).await?;
        record_expired_purged(purged);
        Ok(purged)
    }
}
