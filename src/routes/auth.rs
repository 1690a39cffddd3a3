//! Auth routes: registration, password login, logout, password reset.

use axum::Form;
use axum::extract::{FromRef, FromRequest, Request, State};
use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Json, Response};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use super::error::{ApiError, BAD_LOGIN_DETAIL, CREDENTIALS_DETAIL};
use crate::pages;
use crate::services::password_reset;
use crate::services::session::{self, SessionUser};
use crate::services::user::{self, User, UserError};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from a bearer token or the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

/// Pull a token from `Authorization: Bearer ...`, falling back to the cookie.
pub(crate) fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_owned())
        })
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(|| ApiError::unauthorized(CREDENTIALS_DETAIL))?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &token)
            .await?
            .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_DETAIL))?;

        Ok(Self { user, token })
    }
}

fn session_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `POST /register`: create an account.
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterBody>, ApiError>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = user::create_user(&state.pool, &body.username, &body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// OAuth2 password-grant form. `username` carries the email address.
#[derive(Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /token`: exchange email + password for a bearer token (also set as cookie).
pub async fn token(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): WithRejection<Form<TokenForm>, ApiError>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let limiter_key = user::normalize_email(&form.username).unwrap_or_else(|| form.username.trim().to_owned());
    state.login_limiter.check_and_record(&limiter_key)?;

    let Some(found) = user::authenticate(&state.pool, &form.username, &form.password).await? else {
        tracing::info!(email = %limiter_key, "login rejected");
        return Err(ApiError::unauthorized(BAD_LOGIN_DETAIL));
    };
    state.login_limiter.reset(&limiter_key);

    let access_token = session::create_session(&state.pool, found.id, state.auth.session_ttl).await?;
    tracing::info!(user_id = %found.id, "login succeeded");

    let jar = jar.add(session_cookie(access_token.clone(), state.auth.session_ttl, state.auth.cookie_secure));
    Ok((jar, Json(TokenResponse { access_token, token_type: "bearer".to_owned() })))
}

/// `POST /logout`: delete the session and clear the cookie. The cookie is
/// only cleared once the session row is gone.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<(CookieJar, StatusCode), ApiError> {
    session::delete_session(&state.pool, &auth.token).await?;
    tracing::info!(user_id = %auth.user.id, "logged out");
    let jar = jar.add(session_cookie(String::new(), Duration::ZERO, state.auth.cookie_secure));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// `GET /users/me`: the authenticated user's account.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<User>, ApiError> {
    let user = user::find_by_id(&state.pool, auth.user.id).await.map_err(|e| match e {
        // Session outlived its user row.
        UserError::NotFound => ApiError::unauthorized(CREDENTIALS_DETAIL),
        other => other.into(),
    })?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct ForgotPasswordBody {
    pub email: String,
}

/// `POST /forgot-password`: email a single-use reset link.
pub async fn forgot_password(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ForgotPasswordBody>, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = user::normalize_email(&body.email).ok_or(UserError::InvalidEmail)?;
    state.reset_limiter.check_and_record(&email)?;

    let found = user::find_by_email(&state.pool, &email).await?;
    let reset_token = password_reset::issue_reset_token(&state.pool, found.id, state.auth.reset_token_ttl).await?;
    let link = password_reset::reset_link(&state.auth.public_base_url, &reset_token);
    state.email.send_password_reset(&found.email, &link).await?;
    tracing::info!(user_id = %found.id, "password reset requested");

    Ok(Json(serde_json::json!({ "message": "Password reset email sent" })))
}

#[derive(Deserialize)]
pub struct ResetPasswordBody {
    pub token: String,
    pub new_password: String,
}

/// A reset submission from an API client (JSON) or the reset page (form).
pub enum ResetSubmission {
    Json(ResetPasswordBody),
    Form(ResetPasswordBody),
}

impl<S> FromRequest<S> for ResetSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            let Form(body) = Form::<ResetPasswordBody>::from_request(req, state).await?;
            Ok(Self::Form(body))
        } else {
            let Json(body) = Json::<ResetPasswordBody>::from_request(req, state).await?;
            Ok(Self::Json(body))
        }
    }
}

/// `POST /reset-password`: redeem a reset token. JSON callers get JSON back;
/// the reset page gets HTML, re-showing the form with the error on failure.
pub async fn reset_password(
    State(state): State<AppState>,
    submission: ResetSubmission,
) -> Result<Response, ApiError> {
    match submission {
        ResetSubmission::Json(body) => {
            password_reset::redeem_reset_token(&state.pool, &body.token, &body.new_password).await?;
            Ok(Json(serde_json::json!({ "message": "Password updated" })).into_response())
        }
        ResetSubmission::Form(body) => {
            match password_reset::redeem_reset_token(&state.pool, &body.token, &body.new_password).await {
                Ok(_) => Ok(Html(pages::render_reset_complete()).into_response()),
                Err(e) => {
                    let err = ApiError::from(e);
                    let page = pages::render_reset_password(&body.token, Some(&err.detail));
                    Ok((err.status, Html(page)).into_response())
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
