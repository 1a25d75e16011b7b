//! # Identity
//!
//! One-way hashed user identity.
//!
//! - Normalizes an email (trim + lower-case) and hashes it with SHA-256
//! - Keeps a 16-character hex prefix as the stored identifier
//! - `Identity` is an immutable value; updating it produces a new value

mod error;
mod hasher;

pub use error::IdentityError;
pub use hasher::{hash_email, normalize_email, HashedEmail, Identity, HASH_PREFIX_LEN};
