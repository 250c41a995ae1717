//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use easyjw_core::identity::IdentityError;
use easyjw_portal::{LoginError, PortalError};
use easyjw_shared::{AppError, JwtError};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// `AppError` rendered as `{ "error": <code>, "message": <text> }`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Returns the wrapped error.
    #[must_use]
    pub fn inner(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the log.
        let message = match &self.0 {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %self.0, "Request failed");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self(err.into())
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        Self(match err {
            LoginError::InvalidInput(msg) => AppError::Validation(msg),
            LoginError::BadCredentials => AppError::BadCredentials,
            other @ (LoginError::CaptchaExhausted { .. } | LoginError::NetworkFailure { .. }) => {
                AppError::PortalUnavailable(other.to_string())
            }
        })
    }
}

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        Self(match err {
            PortalError::SessionExpired => AppError::SessionExpired,
            PortalError::Unavailable(msg) => AppError::PortalUnavailable(msg),
            PortalError::InvalidUrl(msg) => AppError::Internal(msg),
        })
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidInput(msg) => Self(AppError::Validation(msg)),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}
