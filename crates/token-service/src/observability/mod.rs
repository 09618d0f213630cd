//! Observability for the token service.
//!
//! # Privacy by Default
//!
//! Service entry points use `#[instrument(skip_all)]` and add fields
//! explicitly. Fields fall in three groups:
//! - **SAFE**: logged as-is (error kinds, counts, durations)
//! - **HASHED**: resource identifiers, logged only through
//!   [`hash_for_correlation`]
//! - **NEVER**: token values, serialized tokens, API keys

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Lets operators follow one resource across log lines without writing
/// the identifier itself.
///
/// This is a correlation aid only and offers no protection for secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // 4 bytes -> 8 hex chars
    hex::encode(result.get(..4).unwrap_or_default())
}
