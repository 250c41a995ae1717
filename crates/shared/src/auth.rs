//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Discriminates access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented on every API call.
    Access,
    /// Long-lived, single-use token exchanged for a new pair.
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (hashed student id).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Not-before timestamp.
    pub nbf: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Unique token id, the revocation handle.
    pub jti: String,
    /// Token kind.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// SHA-256 of the client IP the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_hash: Option<String>,
}

impl Claims {
    /// Creates new claims for a subject.
    #[must_use]
    pub fn new(
        subject: &str,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
        client_ip: Option<&str>,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            iat: now,
            nbf: now,
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            ip_hash: client_ip.map(hash_ip),
        }
    }

    /// Returns the subject (hashed student id).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns the expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Hashes a client IP for embedding in token claims.
#[must_use]
pub fn hash_ip(ip: &str) -> String {
    hex::encode(Sha256::digest(ip.trim().as_bytes()))
}

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair.
    #[must_use]
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

/// Login request payload.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Portal student id.
    pub student_id: String,
    /// Portal password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("student_id", &"[hidden]")
            .field("password", &"[hidden]")
            .finish()
    }
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to invalidate alongside the access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}
