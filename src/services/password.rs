//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so parameters and salt travel with the
//! hash and can be upgraded later without a schema change.
//!
//! Argon2 is memory-hard and takes tens of milliseconds per call. Async
//! callers use [`hash_password_async`] and [`verify_password_async`], which
//! run the work on tokio's blocking pool instead of a runtime worker.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be at least {min} characters", min = MIN_PASSWORD_LEN)]
    TooShort,
    #[error("password must be at most {max} characters", max = MAX_PASSWORD_LEN)]
    TooLong,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Reject passwords outside the accepted length range.
///
/// # Errors
///
/// Returns [`PasswordError::TooShort`] or [`PasswordError::TooLong`].
pub fn validate_password(plain: &str) -> Result<(), PasswordError> {
    let len = plain.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LEN {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if Argon2 rejects the input.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check `plain` against a stored PHC hash. Malformed hashes never verify.
#[must_use]
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Hash of a throwaway secret, verified against when no account matches so
/// unknown emails cost the same as wrong passwords.
pub(crate) static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("limpopo-connect-no-such-user").unwrap_or_default());

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if hashing fails or the task is cancelled.
pub async fn hash_password_async(plain: &str) -> Result<String, PasswordError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if the task panics or is cancelled.
pub async fn verify_password_async(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    let plain = plain.to_owned();
    let stored = stored.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&plain, &stored))
        .await
        .map_err(|e| PasswordError::Hash(e.to_string()))
}
