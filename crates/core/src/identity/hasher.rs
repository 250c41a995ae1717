//! Salted student id hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Identity hashing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Raw id was empty or whitespace only.
    #[error("Invalid student id: {0}")]
    InvalidInput(String),
}

/// Hex-encoded salted SHA-256 of a student id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedStudentId(String);

impl HashedStudentId {
    /// Wraps an already computed hash, e.g. a token subject.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Full hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for logs: `user_` plus the first 8 hex digits.
    #[must_use]
    pub fn short(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("user_{prefix}")
    }
}

impl std::fmt::Display for HashedStudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HashedStudentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deterministic one-way hasher for student ids.
#[derive(Clone)]
pub struct StudentIdHasher {
    salt: String,
}

impl std::fmt::Debug for StudentIdHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentIdHasher")
            .field("salt", &"[hidden]")
            .finish()
    }
}

impl StudentIdHasher {
    /// Creates a hasher with the given secret salt.
    #[must_use]
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hashes a raw student id as `sha256(raw || salt)`.
    ///
    /// Surrounding whitespace is ignored so ids pasted with stray spaces map
    /// to the same key.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidInput` if the id is empty.
    pub fn hash(&self, raw_id: &str) -> Result<HashedStudentId, IdentityError> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return Err(IdentityError::InvalidInput(
                "student id cannot be empty".to_string(),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(raw_id.as_bytes());
        hasher.update(self.salt.as_bytes());
        Ok(HashedStudentId(hex::encode(hasher.finalize())))
    }

    /// Recomputes the hash of `raw_id` and compares it with `hashed`.
    #[must_use]
    pub fn verify(&self, raw_id: &str, hashed: &HashedStudentId) -> bool {
        self.hash(raw_id).is_ok_and(|computed| computed == *hashed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hasher = StudentIdHasher::new("salt");
        let hashed = hasher.hash("2021416001").unwrap();

        assert_eq!(hashed.as_str().len(), 64);
        assert!(hashed.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            hashed.as_str(),
            hex::encode(Sha256::digest(b"2021416001salt"))
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        let hasher = StudentIdHasher::new("salt");
        assert!(matches!(hasher.hash(""), Err(IdentityError::InvalidInput(_))));
        assert!(matches!(hasher.hash("   "), Err(IdentityError::InvalidInput(_))));
    }

    #[test]
    fn test_salt_changes_hash() {
        let a = StudentIdHasher::new("one").hash("2021416001").unwrap();
        let b = StudentIdHasher::new("two").hash("2021416001").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify() {
        let hasher = StudentIdHasher::new("salt");
        let hashed = hasher.hash("2021416001").unwrap();

        assert!(hasher.verify("2021416001", &hashed));
        assert!(hasher.verify(" 2021416001 ", &hashed));
        assert!(!hasher.verify("2021416002", &hashed));
        assert!(!hasher.verify("", &hashed));
    }

    #[test]
    fn test_short_form() {
        let hashed = HashedStudentId::from_hex("abcdef0123456789");
        assert_eq!(hashed.short(), "user_abcdef01");
        assert_eq!(hashed.to_string(), "abcdef0123456789");
    }
}
