//! Secret types for values that must never reach logs.
//!
//! Issued tokens and the static API key travel through the service as
//! [`SecretString`]. Its `Debug` implementation prints a redaction marker,
//! so deriving `Debug` on a struct that holds one stays safe, and the
//! backing memory is zeroized on drop.
//!
//! Reading the value requires an explicit call to
//! [`ExposeSecret::expose_secret`], which keeps every place a token leaves
//! the process easy to grep for.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct IssuedToken {
//!     resource_id: String,
//!     token: SecretString,
//! }
//!
//! let issued = IssuedToken {
//!     resource_id: "user-42".to_string(),
//!     token: SecretString::from("s3cr3t|user-42"),
//! };
//!
//! assert!(!format!("{issued:?}").contains("s3cr3t"));
//! assert_eq!(issued.token.expose_secret(), "s3cr3t|user-42");
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
