//! Background tasks for the token service.
//!
//! - `token_cleanup` - Periodically deletes expired token records

pub mod token_cleanup;

pub use token_cleanup::start_token_cleanup;
