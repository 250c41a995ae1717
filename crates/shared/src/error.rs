//! Application-wide error types.

use thiserror::Error;

use crate::jwt::JwtError;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unusable credentials on the request.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access token expired; the client should refresh.
    #[error("Token expired")]
    TokenExpired,

    /// Token was revoked; the client must log in again.
    #[error("Token revoked")]
    TokenRevoked,

    /// Portal rejected the student id or password.
    #[error("Invalid student id or password")]
    BadCredentials,

    /// Stored portal session is gone or expired.
    #[error("Portal session expired, please log in again")]
    SessionExpired,

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Portal could not be reached or kept failing.
    #[error("Portal unavailable: {0}")]
    PortalUnavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_)
            | Self::TokenExpired
            | Self::TokenRevoked
            | Self::BadCredentials
            | Self::SessionExpired => 401,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::PortalUnavailable(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PortalUnavailable(_) => "PORTAL_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::Revoked => Self::TokenRevoked,
            JwtError::TypeMismatch { .. } => Self::Unauthorized("wrong token type".into()),
            JwtError::Malformed(_) => Self::Unauthorized("invalid token".into()),
            JwtError::IpMismatch => Self::Unauthorized("token bound to another client".into()),
            JwtError::Configuration(msg) | JwtError::EncodingError(msg) => Self::Internal(msg),
            JwtError::Revocation(e) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
