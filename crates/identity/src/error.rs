//! Identity error types

use thiserror::Error;

/// Hashing failures; each one rejects a single identity-set call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Nothing left to hash after normalization
    #[error("email is empty after normalization")]
    EmptyEmail,
}
