use crate::errors::TokenError;
use chrono::{DateTime, Utc};
use common::secret::{ExposeSecret, SecretString};
use common::types::{ResourceId, TOKEN_SEPARATOR};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Token record (maps to token table)
#[derive(Clone, FromRow)]
pub struct TokenRecord {
    pub id: i64,
    pub resource_id: String,
    pub value: String,
    pub expiration: DateTime<Utc>,
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("id", &self.id)
            .field("resource_id", &self.resource_id)
            .field("value", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenRecord {
    /// Whether the record is no longer usable at `now`.
    ///
    /// A record expiring exactly at `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

/// A freshly generated token bound to a resource.
///
/// The record backing it is written before the token is handed out, so a
/// `Token` always corresponds to the live row for its resource at the time
/// it was issued.
#[derive(Debug)]
pub struct Token {
    resource_id: ResourceId,
    value: SecretString,
}

impl Token {
    pub fn new(resource_id: ResourceId, value: SecretString) -> Self {
        Self { resource_id, value }
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Wire form handed to clients: `value|resource_id`.
    pub fn serialize(&self) -> SecretString {
        SecretString::from(format!(
            "{}{}{}",
            self.value.expose_secret(),
            TOKEN_SEPARATOR,
            self.resource_id
        ))
    }
}

/// Token string received from a client, split into its two parts.
///
/// The resource part is kept as a raw string: it is only used as a lookup
/// key, and an identifier that was never issued simply finds no record.
#[derive(Debug)]
pub struct PresentedToken {
    value: SecretString,
    resource_id: String,
}

impl PresentedToken {
    /// Split a raw token on the separator.
    ///
    /// Exactly two parts are accepted; `"abc"` and `"a|b|c"` are both
    /// rejected with [`TokenError::InvalidFormat`].
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let mut parts = raw.split(TOKEN_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(value), Some(resource_id), None) => Ok(Self {
                value: SecretString::from(value),
                resource_id: resource_id.to_string(),
            }),
            _ => Err(TokenError::InvalidFormat),
        }
    }

    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub resource_id: ResourceId,
}

/// Readiness probe response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Database connectivity status.
    pub database: &'static str,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
