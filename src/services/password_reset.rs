//! Password reset tokens.
//!
//! A reset token is a random 32-byte hex string emailed to the account owner.
//! Only its SHA-256 digest is stored. Redemption consumes the token, writes
//! the new password hash and revokes the user's sessions in one transaction:
//! either all three land or the token stays usable. The conditional
//! `UPDATE ... RETURNING` row lock means a token is redeemed at most once
//! even under concurrent requests.

use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::services::password;
use crate::services::session::{self, bytes_to_hex};
use crate::services::user::{self, UserError};

#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("invalid or expired reset token")]
    InvalidToken,
    #[error(transparent)]
    User(#[from] UserError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Build the link placed in the reset email.
#[must_use]
pub fn reset_link(public_base_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={token}", public_base_url.trim_end_matches('/'))
}

/// Issue a reset token for `user_id`, replacing any outstanding ones.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn issue_reset_token(pool: &PgPool, user_id: Uuid, ttl: Duration) -> Result<String, ResetError> {
    sqlx::query("DELETE FROM password_resets WHERE user_id = $1 AND consumed_at IS NULL")
        .bind(user_id)
        .execute(pool)
        .await?;

    let token = session::generate_token();
    let expires_at = OffsetDateTime::now_utc() + ttl;
    sqlx::query("INSERT INTO password_resets (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(hash_reset_token(&token))
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Redeem a reset token: set the new password and revoke all sessions.
///
/// # Errors
///
/// Returns [`ResetError::InvalidToken`] for unknown, expired or used tokens,
/// a password validation error, or a database error.
pub async fn redeem_reset_token(pool: &PgPool, token: &str, new_password: &str) -> Result<Uuid, ResetError> {
    if token.trim().is_empty() {
        return Err(ResetError::InvalidToken);
    }
    // Validate and hash before the transaction so no row lock is held during Argon2.
    password::validate_password(new_password).map_err(UserError::from)?;
    let hashed = password::hash_password_async(new_password).await.map_err(UserError::from)?;

    let mut tx = pool.begin().await?;
    let row = sqlx::query(
        r"UPDATE password_resets
          SET consumed_at = now()
          WHERE token_hash = $1
            AND consumed_at IS NULL
            AND expires_at > now()
          RETURNING user_id",
    )
    .bind(hash_reset_token(token))
    .fetch_optional(tx.as_mut())
    .await?
    .ok_or(ResetError::InvalidToken)?;

    let user_id: Uuid = row.get("user_id");
    user::store_password_hash(tx.as_mut(), user_id, &hashed).await?;
    let revoked = session::delete_user_sessions(tx.as_mut(), user_id).await?;
    tx.commit().await?;
    tracing::info!(%user_id, revoked, "password reset completed");

    Ok(user_id)
}

#[cfg(test)]
#[path = "password_reset_test.rs"]
mod tests;
