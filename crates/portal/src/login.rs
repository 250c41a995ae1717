//! Captcha-solving login.
//!
//! One attempt runs, strictly in order and on one cookie-bearing client:
//! 1. GET the captcha image
//! 2. solve it
//! 3. POST the encoded credentials with the code
//! 4. GET the main page and look for an authenticated marker
//!
//! The portal binds the captcha to the session cookie, so every attempt
//! starts from a fresh client.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::captcha::CaptchaSolver;
use crate::config::PortalConfig;
use crate::cookies::PortalCookies;
use crate::error::{AttemptFailure, LoginError, PortalError};
use crate::session::{PortalSession, build_client};

/// Captcha images smaller than this are error pages, not images.
const MIN_CAPTCHA_BYTES: usize = 100;

/// Solved codes shorter than this are misreads.
const MIN_CAPTCHA_CHARS: usize = 3;

/// Client for logging in to the portal.
#[derive(Clone)]
pub struct PortalClient {
    config: Arc<PortalConfig>,
    solver: Arc<dyn CaptchaSolver>,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Encodes credentials the way the login form expects:
/// `base64(id) + "%%%" + base64(password)`.
#[must_use]
pub fn encode_credentials(student_id: &str, password: &str) -> String {
    format!(
        "{}%%%{}",
        STANDARD.encode(student_id.as_bytes()),
        STANDARD.encode(password.as_bytes())
    )
}

impl PortalClient {
    /// Creates a client.
    pub fn new(config: PortalConfig, solver: Arc<dyn CaptchaSolver>) -> Self {
        Self {
            config: Arc::new(config),
            solver,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Logs in, retrying captcha and network failures up to `max_retries`
    /// attempts in total.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty id or password, without any request.
    /// - `BadCredentials` as soon as the portal rejects the credentials.
    /// - `NetworkFailure` when attempts run out and the last one failed on
    ///   the network, `CaptchaExhausted` otherwise.
    pub async fn login(&self, student_id: &str, password: &str) -> Result<PortalSession, LoginError> {
        if student_id.trim().is_empty() || password.is_empty() {
            return Err(LoginError::InvalidInput(
                "student id and password are required".to_string(),
            ));
        }

        let encoded = encode_credentials(student_id.trim(), password);
        let max_retries = self.config.max_retries.max(1);
        let mut last_failure = None;

        for attempt in 1..=max_retries {
            debug!(attempt, max_retries, "Starting login attempt");

            match self.attempt(&encoded).await {
                Ok(session) => {
                    info!(attempt, "Portal login succeeded");
                    return Ok(session);
                }
                Err(failure) if !failure.is_retryable() => {
                    warn!(attempt, "Portal rejected credentials");
                    return Err(LoginError::BadCredentials);
                }
                Err(failure) => {
                    warn!(attempt, max_retries, reason = ?failure, "Login attempt failed");
                    last_failure = Some(failure);
                }
            }
        }

        warn!(attempts = max_retries, "Portal login gave up");
        Err(match last_failure {
            Some(AttemptFailure::Network(message)) => LoginError::NetworkFailure {
                attempts: max_retries,
                message,
            },
            _ => LoginError::CaptchaExhausted {
                attempts: max_retries,
            },
        })
    }

    /// Rebuilds a session from stored cookies.
    pub fn restore(&self, cookies: &PortalCookies) -> Result<PortalSession, PortalError> {
        PortalSession::from_cookies(Arc::clone(&self.config), cookies)
    }

    async fn attempt(&self, encoded: &str) -> Result<PortalSession, AttemptFailure> {
        let (client, jar) = build_client(&self.config)?;

        let captcha = client.get(self.config.url(&self.config.captcha_path)?).send().await?;
        if captcha.status() != StatusCode::OK {
            return Err(AttemptFailure::Captcha(format!(
                "captcha endpoint returned {}",
                captcha.status()
            )));
        }
        let image = captcha.bytes().await?;
        if image.len() < MIN_CAPTCHA_BYTES {
            return Err(AttemptFailure::Captcha(format!(
                "captcha image too small ({} bytes)",
                image.len()
            )));
        }

        let code = self.solver.classify(&image).await?;
        if code.chars().count() < MIN_CAPTCHA_CHARS {
            return Err(AttemptFailure::Captcha(format!("captcha misread as {code:?}")));
        }

        let response = client
            .post(self.config.url(&self.config.login_path)?)
            .form(&[("RANDOMCODE", code.as_str()), ("encoded", encoded)])
            .send()
            .await?;
        let body = response.text().await?;

        let markers = &self.config.markers;
        if markers.is_bad_credentials(&body) {
            return Err(AttemptFailure::BadCredentials);
        }
        if markers.is_bad_captcha(&body) {
            return Err(AttemptFailure::Captcha("portal rejected captcha".to_string()));
        }

        let main_page = client
            .get(self.config.url(&self.config.main_page_path)?)
            .send()
            .await?
            .text()
            .await?;
        if !markers.is_authenticated(&main_page) {
            return Err(AttemptFailure::Captcha(
                "login did not reach an authenticated page".to_string(),
            ));
        }

        Ok(PortalSession::new(client, jar, Arc::clone(&self.config)))
    }
}
