//! Common data types for the resource token workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the secret value and the resource identifier in the
/// serialized token (`value|resource_id`).
pub const TOKEN_SEPARATOR: char = '|';

/// Reasons a string cannot be used as a [`ResourceId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResourceId {
    /// The identifier is empty.
    #[error("Resource identifier must not be empty")]
    Empty,

    /// The identifier contains the token separator, which would make the
    /// serialized token unparseable.
    #[error("Resource identifier must not contain '|'")]
    ContainsSeparator,
}

/// Identifier of the resource (user, session, device...) a token is bound to.
///
/// At most one live token exists per resource identifier. The value is
/// caller-defined and opaque to the token service, with two restrictions
/// checked at construction: it is non-empty and it never contains
/// [`TOKEN_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Validate and wrap a resource identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidResourceId`] if the value is empty or contains the
    /// token separator.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidResourceId> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvalidResourceId::Empty);
        }
        if value.contains(TOKEN_SEPARATOR) {
            return Err(InvalidResourceId::ContainsSeparator);
        }
        Ok(Self(value))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceId {
    type Error = InvalidResourceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for ResourceId {
    type Err = InvalidResourceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}
