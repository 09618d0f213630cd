//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for serialized tokens.

use token_service::crypto::TOKEN_VALUE_LENGTH;

/// Custom assertions for serialized tokens (`value|resource_id`)
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_token_format()
///     .assert_for_resource("resource-alice")
///     .assert_differs_from(&previous);
/// ```
pub trait TokenAssertions {
    /// Assert that the token has exactly two parts and a well-formed value
    fn assert_token_format(&self) -> &Self;

    /// Assert that the token is bound to the specified resource
    fn assert_for_resource(&self, resource_id: &str) -> &Self;

    /// Assert that the token's secret part differs from another token's
    fn assert_differs_from(&self, other: &str) -> &Self;
}

fn split(token: &str) -> (&str, &str) {
    token
        .split_once('|')
        .unwrap_or_else(|| panic!("Token has no '|' separator: {token:?}"))
}

impl TokenAssertions for str {
    fn assert_token_format(&self) -> &Self {
        let parts = self.split('|').count();
        assert_eq!(
            parts, 2,
            "Token must have 2 parts (value|resource_id), got {}",
            parts
        );

        let (value, resource) = split(self);
        assert_eq!(
            value.len(),
            TOKEN_VALUE_LENGTH,
            "Token value must be {} characters",
            TOKEN_VALUE_LENGTH
        );
        assert!(
            value.chars().all(|c| c.is_ascii_alphanumeric()),
            "Token value must be alphanumeric"
        );
        assert!(!resource.is_empty(), "Token resource must not be empty");

        self
    }

    fn assert_for_resource(&self, resource_id: &str) -> &Self {
        let (_, resource) = split(self);
        assert_eq!(
            resource, resource_id,
            "Token is bound to '{}', expected '{}'",
            resource, resource_id
        );
        self
    }

    fn assert_differs_from(&self, other: &str) -> &Self {
        let (value, _) = split(self);
        let (other_value, _) = split(other);
        assert_ne!(value, other_value, "Expected a freshly generated token value");
        self
    }
}

impl TokenAssertions for String {
    fn assert_token_format(&self) -> &Self {
        self.as_str().assert_token_format();
        self
    }

    fn assert_for_resource(&self, resource_id: &str) -> &Self {
        self.as_str().assert_for_resource(resource_id);
        self
    }

    fn assert_differs_from(&self, other: &str) -> &Self {
        self.as_str().assert_differs_from(other);
        self
    }
}
