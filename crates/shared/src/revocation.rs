//! Token revocation storage.
//!
//! Revoked tokens are tracked by `jti` until their natural expiry. The
//! in-memory store only covers a single process; deployments running more than
//! one instance must plug in a shared store (see `easyjw_db::RevokedTokenRepository`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

/// Errors raised by a revocation backend.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The backing store failed.
    #[error("revocation store unavailable: {0}")]
    Backend(String),
}

/// Storage for revoked token ids.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks a token id as revoked until `expires_at`.
    ///
    /// Returns true only for the call that inserted the id, so concurrent
    /// callers can tell which of them consumed the token.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, RevocationError>;

    /// Returns true if the token id has been revoked.
    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError>;

    /// Drops entries whose token would have expired anyway.
    async fn purge_expired(&self) -> Result<u64, RevocationError>;
}

/// Process-local revocation store.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: DashMap<String, DateTime<Utc>>,
}

impl InMemoryRevocationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked token ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    /// Returns true if nothing is revoked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, RevocationError> {
        match self.revoked.entry(jti.to_string()) {
            Entry::Occupied(mut existing) => {
                if expires_at > *existing.get() {
                    existing.insert(expires_at);
                }
                Ok(false)
            }
            Entry::Vacant(slot) => {
                slot.insert(expires_at);
                Ok(true)
            }
        }
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationError> {
        Ok(self.revoked.contains_key(jti))
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let now = Utc::now();
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now);
        Ok((before - self.revoked.len()) as u64)
    }
}
