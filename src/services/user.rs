//! User accounts: registration, lookup, credential checks.

use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::password::{self, PasswordError};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse a stored role. Anything unrecognized is treated as a plain user.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("username must be {min}-{max} characters", min = MIN_USERNAME_LEN, max = MAX_USERNAME_LEN)]
    InvalidUsername,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("Email already registered")]
    EmailTaken,
    #[error("user not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    hashed_password: String,
    role: String,
    profile_picture: Option<String>,
    created_at: OffsetDateTime,
}

/// Public view of a user. The password hash is never part of it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role: Role::parse(&row.role),
            profile_picture: row.profile_picture,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, hashed_password, role, profile_picture, created_at";

/// Trim, lowercase and sanity-check an email address.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || normalized.contains(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// Trim a username and enforce its length bounds.
#[must_use]
pub fn normalize_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return None;
    }
    Some(trimmed.to_owned())
}

/// Register a new account with role `user`.
///
/// # Errors
///
/// Returns a validation error, [`UserError::EmailTaken`] for a duplicate
/// email, or a database error.
pub async fn create_user(pool: &PgPool, username: &str, email: &str, plain_password: &str) -> Result<User, UserError> {
    let username = normalize_username(username).ok_or(UserError::InvalidUsername)?;
    let email = normalize_email(email).ok_or(UserError::InvalidEmail)?;
    password::validate_password(plain_password)?;
    let hashed = password::hash_password_async(plain_password).await?;

    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (username, email, hashed_password, role)
         VALUES ($1, $2, $3, 'user')
         ON CONFLICT (email) DO NOTHING
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&username)
    .bind(&email)
    .bind(&hashed)
    .fetch_optional(pool)
    .await?
    .ok_or(UserError::EmailTaken)?;

    tracing::info!(user_id = %row.id, "user registered");
    Ok(row.into())
}

/// Look up a user by id.
///
/// # Errors
///
/// Returns [`UserError::NotFound`] or a database error.
pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<User, UserError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(row.into())
}

/// Look up a user by (unnormalized) email.
///
/// # Errors
///
/// Returns [`UserError::InvalidEmail`], [`UserError::NotFound`] or a database error.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<User, UserError> {
    let email = normalize_email(email).ok_or(UserError::InvalidEmail)?;
    let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(row.into())
}

/// Check an email/password pair. Returns `Ok(None)` for any mismatch so
/// callers cannot distinguish unknown emails from wrong passwords. Unknown
/// emails still pay for one Argon2 verification so timing does not leak
/// which accounts exist.
///
/// # Errors
///
/// Returns a database error if the lookup fails, or a password error if the
/// hashing task fails.
pub async fn authenticate(pool: &PgPool, email: &str, plain_password: &str) -> Result<Option<User>, UserError> {
    let row = match normalize_email(email) {
        Some(email) => {
            sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(&email)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };

    let Some(row) = row else {
        password::verify_password_async(plain_password, &password::DUMMY_HASH).await?;
        return Ok(None);
    };
    if !password::verify_password_async(plain_password, &row.hashed_password).await? {
        return Ok(None);
    }
    Ok(Some(row.into()))
}

/// Replace a user's password hash.
///
/// # Errors
///
/// Returns a validation error, [`UserError::NotFound`] or a database error.
pub async fn set_password(pool: &PgPool, user_id: Uuid, plain_password: &str) -> Result<(), UserError> {
    password::validate_password(plain_password)?;
    let hashed = password::hash_password_async(plain_password).await?;
    store_password_hash(pool, user_id, &hashed).await
}

/// Write an already-computed hash. Takes any executor so it can join a
/// caller's transaction.
///
/// # Errors
///
/// Returns [`UserError::NotFound`] or a database error.
pub async fn store_password_hash<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    hashed: &str,
) -> Result<(), UserError> {
    let result = sqlx::query("UPDATE users SET hashed_password = $2 WHERE id = $1")
        .bind(user_id)
        .bind(hashed)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
