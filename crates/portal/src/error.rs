//! Error types for the portal client.

use thiserror::Error;

/// Why a login did not produce a session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginError {
    /// Student id or password was empty.
    #[error("Invalid login input: {0}")]
    InvalidInput(String),

    /// The portal rejected the credentials. Never retried.
    #[error("Portal rejected the student id or password")]
    BadCredentials,

    /// Every attempt failed on the captcha or the post-login main page check.
    #[error("Captcha could not be solved after {attempts} attempts")]
    CaptchaExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// The last attempt failed on the network.
    #[error("Portal unreachable after {attempts} attempts: {message}")]
    NetworkFailure {
        /// Attempts made.
        attempts: u32,
        /// Last transport error.
        message: String,
    },
}

/// Errors from authenticated portal reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortalError {
    /// The portal no longer recognizes the session cookies.
    #[error("Portal session expired")]
    SessionExpired,

    /// Network error, timeout or unexpected status.
    #[error("Portal unavailable: {0}")]
    Unavailable(String),

    /// Configured URL could not be built.
    #[error("Invalid portal URL: {0}")]
    InvalidUrl(String),
}

impl PortalError {
    /// Returns true if the stored session should be dropped and the user sent
    /// back to login.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<url::ParseError> for PortalError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Errors from a captcha solver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptchaError {
    /// The OCR backend could not be reached or failed.
    #[error("Captcha solver unavailable: {0}")]
    Unavailable(String),

    /// The OCR backend answered with something unusable.
    #[error("Captcha unreadable: {0}")]
    Unreadable(String),
}

impl From<reqwest::Error> for CaptchaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Outcome of one failed login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptFailure {
    /// Wrong id or password.
    BadCredentials,
    /// Captcha missing, unreadable or rejected, or the login did not stick.
    Captcha(String),
    /// Transport error or timeout.
    Network(String),
}

impl AttemptFailure {
    /// Returns true if another attempt may succeed.
    pub(crate) fn is_retryable(&self) -> bool {
        !matches!(self, Self::BadCredentials)
    }
}

impl From<reqwest::Error> for AttemptFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<url::ParseError> for AttemptFailure {
    fn from(err: url::ParseError) -> Self {
        Self::Network(format!("invalid portal url: {err}"))
    }
}

impl From<CaptchaError> for AttemptFailure {
    fn from(err: CaptchaError) -> Self {
        Self::Captcha(err.to_string())
    }
}
