//! JWT token generation and validation.
//!
//! Provides HS256 access and refresh tokens bound to a hashed student id,
//! optional client IP binding, single-use refresh and revocation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{Claims, TokenPair, TokenType, hash_ip};
use crate::revocation::{RevocationError, RevocationStore};

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in minutes.
    pub access_token_expires_minutes: i64,
    /// Refresh token expiration in days.
    pub refresh_token_expires_days: i64,
    /// Whether tokens carrying an IP hash are checked against the caller IP.
    pub bind_client_ip: bool,
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// The service was built without a usable signing secret.
    #[error("invalid token configuration: {0}")]
    Configuration(String),

    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Signature is valid but the token has expired.
    #[error("token has expired")]
    Expired,

    /// Token id is on the revocation list.
    #[error("token has been revoked")]
    Revoked,

    /// Token kind does not match what the caller requires.
    #[error("expected {expected} token, got {actual}")]
    TypeMismatch {
        /// Required kind.
        expected: TokenType,
        /// Kind found in the claims.
        actual: TokenType,
    },

    /// Bad signature or any other decode failure.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Token was issued to a different client IP.
    #[error("token is bound to a different client")]
    IpMismatch,

    /// Revocation backend failed.
    #[error(transparent)]
    Revocation(#[from] RevocationError),
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    revocations: Arc<dyn RevocationStore>,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expires_minutes", &self.config.access_token_expires_minutes)
            .field("refresh_token_expires_days", &self.config.refresh_token_expires_days)
            .field("bind_client_ip", &self.config.bind_client_ip)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a new JWT service.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Configuration` if the secret is empty or a lifetime
    /// is not positive.
    pub fn new(config: JwtConfig, revocations: Arc<dyn RevocationStore>) -> Result<Self, JwtError> {
        if config.secret.trim().is_empty() {
            return Err(JwtError::Configuration("signing secret is empty".into()));
        }
        if config.access_token_expires_minutes <= 0 || config.refresh_token_expires_days <= 0 {
            return Err(JwtError::Configuration("token lifetimes must be positive".into()));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            revocations,
        })
    }

    /// Generates an access token for a hashed student id.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_access(&self, subject: &str, client_ip: Option<&str>) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.access_token_expires_minutes);
        self.sign(&Claims::new(subject, TokenType::Access, expires_at, client_ip))
    }

    /// Generates a refresh token for a hashed student id.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_refresh(&self, subject: &str, client_ip: Option<&str>) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::days(self.config.refresh_token_expires_days);
        self.sign(&Claims::new(subject, TokenType::Refresh, expires_at, client_ip))
    }

    /// Generates an access/refresh pair.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_pair(&self, subject: &str, client_ip: Option<&str>) -> Result<TokenPair, JwtError> {
        let access = self.issue_access(subject, client_ip)?;
        let refresh = self.issue_refresh(subject, client_ip)?;
        Ok(TokenPair::new(access, refresh, self.access_token_expires_in()))
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    fn decode_claims(&self, token: &str, check_times: bool) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = check_times;
        validation.validate_nbf = check_times;
        // Expiry is exact: no grace period past `exp`.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Malformed(e.to_string()),
            })
    }

    /// Validates a token of the expected kind and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `Expired`, `Malformed`, `TypeMismatch`, `Revoked` or
    /// `IpMismatch` depending on which check fails first.
    pub async fn verify(
        &self,
        token: &str,
        expected: TokenType,
        client_ip: Option<&str>,
    ) -> Result<Claims, JwtError> {
        let claims = self.decode_claims(token, true)?;

        if claims.token_type != expected {
            return Err(JwtError::TypeMismatch {
                expected,
                actual: claims.token_type,
            });
        }

        if self.revocations.is_revoked(&claims.jti).await? {
            debug!(jti = %claims.jti, "Rejected revoked token");
            return Err(JwtError::Revoked);
        }

        // Relaxed mode: either side missing an IP skips the check.
        if self.config.bind_client_ip {
            if let (Some(bound), Some(ip)) = (claims.ip_hash.as_deref(), client_ip) {
                if bound != hash_ip(ip) {
                    warn!(jti = %claims.jti, "Token presented from a different client IP");
                    return Err(JwtError::IpMismatch);
                }
            }
        }

        Ok(claims)
    }

    /// Exchanges a refresh token for a new pair. The old token is revoked
    /// before the new pair is signed.
    ///
    /// Only the caller whose revocation inserted the jti gets a pair; a
    /// concurrent exchange of the same token fails with `Revoked`.
    ///
    /// # Errors
    ///
    /// Returns any `verify` error for the presented token, or a revocation /
    /// encoding error.
    pub async fn refresh(&self, refresh_token: &str, client_ip: Option<&str>) -> Result<TokenPair, JwtError> {
        let claims = self.verify(refresh_token, TokenType::Refresh, client_ip).await?;
        if !self
            .revocations
            .revoke(&claims.jti, claims.expires_at())
            .await?
        {
            warn!(jti = %claims.jti, "Refresh token already consumed");
            return Err(JwtError::Revoked);
        }

        let pair = self.issue_pair(&claims.sub, client_ip)?;
        info!(jti = %claims.jti, "Refresh token exchanged");
        Ok(pair)
    }

    /// Revokes a token regardless of kind or expiry.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Malformed` if the token signature cannot be checked.
    pub async fn revoke(&self, token: &str) -> Result<(), JwtError> {
        let claims = self.decode_claims(token, false)?;
        self.revoke_claims(&claims).await
    }

    /// Revokes already-decoded claims.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Revocation` if the store fails.
    pub async fn revoke_claims(&self, claims: &Claims) -> Result<(), JwtError> {
        self.revocations
            .revoke(&claims.jti, claims.expires_at())
            .await?;
        Ok(())
    }

    /// Returns the access token expiration in seconds.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.config.access_token_expires_minutes * 60
    }

    /// Returns the refresh token expiration in days.
    #[must_use]
    pub const fn refresh_token_expires_days(&self) -> i64 {
        self.config.refresh_token_expires_days
    }

    /// Returns the revocation store backing this service.
    #[must_use]
    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }
}
