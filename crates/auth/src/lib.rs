//! # Alexandria Auth Crate
//!
//! Password hashing for catalog accounts. This crate owns the single
//! correctness-critical rule of credential storage: a stored digest embeds
//! its own salt, so a challenge must always be verified *against the stored
//! digest* rather than hashed with a fresh salt (which would never match).
//!
//! ## Public API
//!
//! - `hash_password`: Produces a salted bcrypt digest for storage.
//! - `verify_password`: Checks a login challenge against a stored digest.
//! - `AuthError`: The specific error types that can be returned from this crate.

use bcrypt::{DEFAULT_COST, hash, verify};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hashes a plaintext password with a freshly generated salt.
///
/// Two calls with the same input produce different digests; the per-record
/// salt is what keeps identical passwords from sharing a stored value.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Verifies a login challenge against a stored digest.
///
/// The salt embedded in `stored_digest` is reused for the comparison.
/// Returns `false` for a mismatch; errors only if the stored digest is not
/// a well-formed bcrypt string.
pub fn verify_password(challenge: &str, stored_digest: &str) -> Result<bool, AuthError> {
    Ok(verify(challenge, stored_digest)?)
}
