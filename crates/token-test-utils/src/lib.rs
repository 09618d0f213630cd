//! # Token Test Utilities
//!
//! Shared test utilities for the token service.
//!
//! This crate provides:
//! - Temporary file-backed token stores (`TestDatabase`)
//! - Server test harness (`TestTokenServer` for E2E tests)
//! - Fixed test resource identifiers
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestTokenServer::spawn().await?;
//!     let token = server.login(TEST_RESOURCE_ALICE).await?;
//!
//!     token
//!         .assert_token_format()
//!         .assert_for_resource(TEST_RESOURCE_ALICE);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod server_harness;
pub mod test_db;
pub mod test_ids;

// Re-export commonly used items
pub use assertions::*;
pub use server_harness::*;
pub use test_db::*;
pub use test_ids::*;
