//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

/// Client IP as reported by the reverse proxy.
///
/// Reads the first `X-Forwarded-For` entry, then `X-Real-IP`. `None` when
/// neither header is usable, in which case tokens are not IP-bound.
///
/// Both headers are client-controlled. The server must sit behind a trusted
/// reverse proxy that overwrites `X-Forwarded-For` and `X-Real-IP` on every
/// request; exposed directly, any caller can claim any IP and IP binding
/// protects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    /// Reads the client IP from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        };

        Self(forwarded.or_else(real_ip).map(ToString::to_string))
    }

    /// Returns the IP, if known.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
