use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Outcome of a failed token operation.
///
/// Every variant is an expected result of validating client input or of a
/// storage round-trip; none of them is a programming error. The `Display`
/// text is safe to return to clients. Storage and generation details are
/// kept in the variant payload for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token has not been provided")]
    NotProvided,

    #[error("Provided token has not the proper format")]
    InvalidFormat,

    #[error("Token for requested resource not found")]
    ResourceNotFound,

    #[error("Token expired and thus cannot be used")]
    Expired,

    #[error("Database error occurred")]
    Database(String),

    #[error("Token value does not match")]
    InvalidValue,

    #[error("Token generation failed")]
    Crypto(String),
}

impl TokenError {
    /// Stable numeric code exposed in detailed error bodies.
    pub fn code(&self) -> u16 {
        match self {
            TokenError::NotProvided => 900,
            TokenError::InvalidFormat => 901,
            TokenError::ResourceNotFound => 902,
            TokenError::Expired => 903,
            TokenError::Database(_) => 904,
            TokenError::InvalidValue => 905,
            TokenError::Crypto(_) => 906,
        }
    }

    /// Bounded label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::NotProvided => "not_provided",
            TokenError::InvalidFormat => "invalid_format",
            TokenError::ResourceNotFound => "resource_not_found",
            TokenError::Expired => "expired",
            TokenError::Database(_) => "database",
            TokenError::InvalidValue => "invalid_value",
            TokenError::Crypto(_) => "crypto",
        }
    }

    /// Whether the failure was caused by the presented token rather than
    /// by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TokenError::Database(_) | TokenError::Crypto(_))
    }

    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Generic refusal that hides the underlying reason from the client.
    #[error("Forbidden")]
    Forbidden,

    /// Detailed token failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Map a token failure according to the configured disclosure policy.
    pub fn from_token_error(err: TokenError, forbidden_on_error: bool) -> Self {
        if forbidden_on_error {
            ApiError::Forbidden
        } else {
            ApiError::Token(err)
        }
    }
}

/// JSON error body. Success bodies use the same `result` discriminator.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    result: &'static str,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match &self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string(), None),
            ApiError::Token(err) => (err.status_code(), err.to_string(), Some(err.code())),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
        };

        let body = ErrorEnvelope {
            result: "error",
            errors: vec![message],
            code,
        };

        (status, Json(body)).into_response()
    }
}
