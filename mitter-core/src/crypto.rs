//! Cryptographic utilities for credentials and session tokens
//!
//! Passwords are low-entropy secrets and are hashed with Argon2 through the
//! `password-auth` crate, which produces salted PHC strings that carry their
//! own parameters.
//!
//! Session tokens are 256-bit random values. They are stored as SHA-256
//! digests and compared in constant time, so a leaked session table does not
//! hand out live tokens and lookups do not leak timing information.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Generate a cryptographically secure random token.
///
/// Produces 32 random bytes from the OS generator, encoded as URL-safe
/// base64 without padding (43 characters).
pub fn generate_secure_token() -> Result<String, CryptoError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Random(e.to_string()))?;
    Ok(base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        bytes,
    ))
}

/// Hash a token for storage. Returns the hex-encoded SHA-256 digest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a token against a stored digest with constant-time comparison.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(computed_hash.as_bytes(), stored_hash.as_bytes())
}

pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Hash a plaintext password into a salted PHC string.
pub fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}

/// Verify a plaintext password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed is
/// an error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CryptoError> {
    match password_auth::verify_password(password, hash) {
        Ok(()) => Ok(true),
        Err(password_auth::VerifyError::PasswordInvalid) => Ok(false),
        Err(e) => Err(CryptoError::PasswordHash(e.to_string())),
    }
}
