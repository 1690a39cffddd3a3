//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`. The body is always
//! `{"detail": "..."}`. Internal failures are logged here and reported to the
//! client without their cause. Body and query extractors are wrapped in
//! `WithRejection<_, ApiError>` so malformed input gets the same shape.

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::{IntoResponse, Json, Response};

use crate::rate_limit::RateLimitError;
use crate::services::ad::AdError;
use crate::services::email::EmailError;
use crate::services::password::PasswordError;
use crate::services::password_reset::ResetError;
use crate::services::user::UserError;

pub const CREDENTIALS_DETAIL: &str = "Could not validate credentials";
pub const BAD_LOGIN_DETAIL: &str = "Incorrect email or password";
const INTERNAL_DETAIL: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
    /// Attach `WWW-Authenticate: Bearer` (401 responses only).
    pub bearer_challenge: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into(), bearer_challenge: false }
    }

    #[must_use]
    pub fn unauthorized(detail: &str) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, detail: detail.to_owned(), bearer_challenge: true }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    #[must_use]
    pub fn internal(context: &str, err: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        if self.bearer_challenge {
            (self.status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal("database error", &err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort | PasswordError::TooLong => Self::bad_request(err.to_string()),
            PasswordError::Hash(_) => Self::internal("password hashing failed", &err),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidEmail | UserError::InvalidUsername | UserError::EmailTaken => {
                Self::bad_request(err.to_string())
            }
            UserError::Password(inner) => inner.into(),
            UserError::NotFound => Self::new(StatusCode::NOT_FOUND, "User not found"),
            UserError::Db(inner) => inner.into(),
        }
    }
}

impl From<ResetError> for ApiError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::InvalidToken => Self::bad_request(err.to_string()),
            ResetError::User(inner) => inner.into(),
            ResetError::Db(inner) => inner.into(),
        }
    }
}

impl From<AdError> for ApiError {
    fn from(err: AdError) -> Self {
        match err {
            AdError::NotFound(ad_id) => {
                tracing::debug!(%ad_id, "ad not found");
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            AdError::InvalidId | AdError::Invalid { .. } => Self::bad_request(err.to_string()),
            AdError::Forbidden(ad_id) => {
                tracing::info!(%ad_id, "ad access denied");
                Self::new(StatusCode::FORBIDDEN, err.to_string())
            }
            AdError::Database(inner) => inner.into(),
        }
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        tracing::warn!(error = %err, "auth rate limit hit");
        Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string())
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        Self::internal("email delivery failed", &err)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
