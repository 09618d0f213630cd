use common::config::{DatabaseConfig, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::services::token_service::DEFAULT_TOKEN_TTL_SECONDS;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_PARAMETER_NAME: &str = "token";
pub const DEFAULT_TOKEN_HEADER_NAME: &str = "X-Auth-Token";
pub const DEFAULT_LOGIN_ROUTE: &str = "/api/v1/login";
/// Paths the router already serves; the login route may not reuse them.
pub const RESERVED_ROUTES: [&str; 5] = [
    "/health",
    "/ready",
    "/metrics",
    "/api/v1/me",
    "/api/v1/logout",
];
pub const DEFAULT_CLEANUP_INTERVAL_SECONDS: u64 = 300;
/// Upper bound on token lifetime (one year).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;
pub const DEFAULT_API_KEY_HEADER_NAME: &str = "X-API-KEY";
pub const DEFAULT_API_KEY_PARAMETER_NAME: &str = "apikey";

/// Token guard settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Whether `/api/v1` routes require a token at all.
    pub enabled: bool,
    pub ttl_seconds: i64,
    /// Query parameter read from requests and field name in responses.
    pub parameter_name: String,
    pub header_name: String,
    /// Path that issues tokens; served outside the guard.
    pub login_route: String,
    /// Answer every token failure with a bare 403 instead of a detailed body.
    pub forbidden_on_error: bool,
    /// Period of the expired-token purge; 0 disables it.
    pub cleanup_interval_seconds: u64,
}

/// Static API key settings. `key` is `Some` whenever `enabled` is set.
#[derive(Debug, Clone)]
pub struct ApiKeyConfig {
    pub enabled: bool,
    pub key: Option<SecretString>,
    pub header_name: String,
    pub parameter_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bind_address: String,
    pub token: TokenConfig,
    pub api_key: ApiKeyConfig,
    /// Delay between the shutdown signal and closing the listener.
    pub shutdown_drain_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            url: string_or(vars, "DATABASE_URL", DEFAULT_DATABASE_URL),
            max_connections: parse_or(vars, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            ..DatabaseConfig::default()
        };
        if database.max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "must be at least 1"));
        }

        let bind_address = string_or(vars, "BIND_ADDRESS", DEFAULT_BIND_ADDRESS);

        let ttl_seconds = parse_or(vars, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?;
        if ttl_seconds <= 0 {
            return Err(invalid("TOKEN_TTL_SECONDS", "must be greater than 0"));
        }
        if ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(invalid(
                "TOKEN_TTL_SECONDS",
                format!("must not exceed {}", MAX_TOKEN_TTL_SECONDS),
            ));
        }

        let login_route = string_or(vars, "TOKEN_LOGIN_ROUTE", DEFAULT_LOGIN_ROUTE);
        if !login_route.starts_with('/') {
            return Err(invalid("TOKEN_LOGIN_ROUTE", "must start with '/'"));
        }
        if RESERVED_ROUTES.contains(&login_route.as_str()) {
            return Err(invalid(
                "TOKEN_LOGIN_ROUTE",
                format!("{} is already served by another handler", login_route),
            ));
        }
        if login_route.contains([':', '*']) {
            return Err(invalid("TOKEN_LOGIN_ROUTE", "must not contain path captures"));
        }

        let token = TokenConfig {
            enabled: parse_bool_or(vars, "TOKEN_ENABLED", true)?,
            ttl_seconds,
            parameter_name: string_or(vars, "TOKEN_PARAMETER_NAME", DEFAULT_TOKEN_PARAMETER_NAME),
            header_name: string_or(vars, "TOKEN_HEADER_NAME", DEFAULT_TOKEN_HEADER_NAME),
            login_route,
            forbidden_on_error: parse_bool_or(vars, "TOKEN_FORBIDDEN_ON_ERROR", true)?,
            cleanup_interval_seconds: parse_or(
                vars,
                "TOKEN_CLEANUP_INTERVAL_SECONDS",
                DEFAULT_CLEANUP_INTERVAL_SECONDS,
            )?,
        };

        let api_key_enabled = parse_bool_or(vars, "API_KEY_ENABLED", false)?;
        let key = vars
            .get("API_KEY")
            .filter(|k| !k.is_empty())
            .map(|k| SecretString::from(k.as_str()));
        if api_key_enabled && key.is_none() {
            return Err(ConfigError::MissingEnvVar("API_KEY".to_string()));
        }

        let api_key = ApiKeyConfig {
            enabled: api_key_enabled,
            key,
            header_name: string_or(vars, "API_KEY_HEADER_NAME", DEFAULT_API_KEY_HEADER_NAME),
            parameter_name: string_or(
                vars,
                "API_KEY_PARAMETER_NAME",
                DEFAULT_API_KEY_PARAMETER_NAME,
            ),
        };

        let shutdown_drain_seconds = parse_or(vars, "SHUTDOWN_DRAIN_SECONDS", 0)?;

        Ok(Config {
            database,
            bind_address,
            token,
            api_key,
            shutdown_drain_seconds,
        })
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn string_or(vars: &HashMap<String, String>, name: &str, default: &str) -> String {
    vars.get(name)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(name, format!("{}", e))),
        None => Ok(default),
    }
}

fn parse_bool_or(
    vars: &HashMap<String, String>,
    name: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, format!("expected a boolean, got {:?}", v))),
        },
    }
}
