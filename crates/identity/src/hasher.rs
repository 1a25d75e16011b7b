//! Email normalization and hashing

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::error::IdentityError;

/// Length of the stored hex prefix
pub const HASH_PREFIX_LEN: usize = 16;

/// Opaque hashed email (16 hex chars)
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedEmail(String);

impl HashedEmail {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashedEmail({})", self.0)
    }
}

impl fmt::Display for HashedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim surrounding whitespace and lower-case
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a normalized email into its stored identifier
///
/// # Errors
/// `IdentityError::EmptyEmail` if the input is blank.
pub fn hash_email(email: &str) -> Result<HashedEmail, IdentityError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(IdentityError::EmptyEmail);
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hex::encode(hasher.finalize());

    Ok(HashedEmail(digest[..HASH_PREFIX_LEN].to_string()))
}

/// Identity context for the current session
///
/// Absent until sign-up; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    hashed_email: Option<HashedEmail>,
}

impl Identity {
    /// No identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Identity from a raw email
    #[instrument(name = "identity_from_email", skip(email))]
    pub fn from_email(email: &str) -> Result<Self, IdentityError> {
        let hashed = hash_email(email)?;
        debug!(hashed_email = %hashed, "Identity set");
        Ok(Self::from_hashed(hashed))
    }

    /// Identity from an already hashed value
    pub fn from_hashed(hashed_email: HashedEmail) -> Self {
        Self {
            hashed_email: Some(hashed_email),
        }
    }

    pub fn hashed_email(&self) -> Option<&HashedEmail> {
        self.hashed_email.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.hashed_email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_fixed_length_hex() {
        let hashed = hash_email("user@example.com").unwrap();
        assert_eq!(hashed.as_str().len(), HASH_PREFIX_LEN);
        assert!(hashed.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_ignores_case_and_whitespace() {
        let a = hash_email("A@B.com").unwrap();
        let b = hash_email("a@b.com ").unwrap();
        let c = hash_email("\t  a@B.COM\n").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_hash_known_value() {
        // sha256("a@b.com")
        let hashed = hash_email("a@b.com").unwrap();
        let mut hasher = Sha256::new();
        hasher.update(b"a@b.com");
        let full = hex::encode(hasher.finalize());
        assert_eq!(hashed.as_str(), &full[..16]);
    }

    #[test]
    fn test_different_emails_differ() {
        assert_ne!(
            hash_email("alice@example.com").unwrap(),
            hash_email("bob@example.com").unwrap()
        );
    }

    #[test]
    fn test_empty_email_rejected() {
        assert_eq!(hash_email("   "), Err(IdentityError::EmptyEmail));
    }

    #[test]
    fn test_identity_set_is_idempotent_under_normalization() {
        let first = Identity::from_email("A@B.com").unwrap();
        let second = Identity::from_email("a@b.com ").unwrap();
        assert_eq!(first.hashed_email(), second.hashed_email());
    }

    #[test]
    fn test_anonymous_identity() {
        let identity = Identity::anonymous();
        assert!(identity.is_anonymous());
        assert!(identity.hashed_email().is_none());
    }
}
