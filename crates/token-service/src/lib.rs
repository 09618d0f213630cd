//! Resource Token Service Library
//!
//! Issues opaque, single-use bearer tokens bound to a resource identifier,
//! stores them with an expiration, and validates and consumes them on later
//! requests.
//!
//! # Architecture
//!
//! The service follows the Handler -> Service -> Repository pattern:
//!
//! ```text
//! routes/mod.rs -> middleware/*.rs, handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `crypto` - Token value generation and constant-time comparison
//! - `db` - SQLite pool setup and schema bootstrap
//! - `errors` - Token error taxonomy with HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - API key, token guard and HTTP metrics middleware
//! - `models` - Token records and wire format
//! - `observability` - Metrics and log correlation helpers
//! - `repositories` - Token table queries
//! - `routes` - Axum router setup
//! - `services` - Token issuance and consumption
//! - `tasks` - Expired token purge

pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod tasks;
