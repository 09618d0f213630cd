//! Random token values and constant-time comparison.

use crate::errors::TokenError;
use common::secret::SecretString;
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;
use tracing::instrument;

/// Length of the secret part of every issued token.
pub const TOKEN_VALUE_LENGTH: usize = 64;

/// Characters a token value is drawn from. Never contains the token separator.
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte. Random bytes at
/// or above it are discarded so every character is equally likely.
const REJECTION_THRESHOLD: u8 = (256 / TOKEN_ALPHABET.len() * TOKEN_ALPHABET.len()) as u8;

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, TokenError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|e| TokenError::Crypto(format!("Random bytes generation failed: {}", e)))?;
    Ok(bytes)
}

/// Generate a random alphanumeric string of `len` characters.
pub fn random_alphanumeric(len: usize) -> Result<String, TokenError> {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for byte in generate_random_bytes(len)? {
            if byte >= REJECTION_THRESHOLD {
                continue;
            }
            if let Some(&c) = TOKEN_ALPHABET.get(usize::from(byte) % TOKEN_ALPHABET.len()) {
                out.push(char::from(c));
            }
            if out.len() == len {
                break;
            }
        }
    }
    Ok(out)
}

/// Generate the secret value of a new token.
///
/// Returns a `SecretString` so the value cannot end up in debug output.
#[instrument(skip_all)]
pub fn generate_token_value() -> Result<SecretString, TokenError> {
    random_alphanumeric(TOKEN_VALUE_LENGTH).map(SecretString::from)
}

/// Compare two secrets without short-circuiting on the first differing byte.
///
/// Length is not hidden; token values have a fixed public length.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
