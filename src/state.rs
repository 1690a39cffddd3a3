//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It is
//! the server-side context every route reads from: the database pool, the
//! outbound email sender, auth rate limiters and the session settings.

use std::sync::Arc;

use sqlx::PgPool;
use time::Duration;

use crate::config::AppConfig;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::email::EmailSender;

/// Session and reset-link settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub cookie_secure: bool,
    pub public_base_url: String,
}

impl AuthSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            session_ttl: Duration::hours(config.session_ttl_hours),
            reset_token_ttl: Duration::minutes(config.reset_token_ttl_minutes),
            cookie_secure: config.cookie_secure,
            public_base_url: config.public_base_url.clone(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24 * 7),
            reset_token_ttl: Duration::minutes(30),
            cookie_secure: false,
            public_base_url: "http://localhost:3000".to_owned(),
        }
    }
}

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub email: Arc<EmailSender>,
    /// Failed-login limiter keyed by normalized email.
    pub login_limiter: RateLimiter,
    /// Password-reset request limiter keyed by normalized email.
    pub reset_limiter: RateLimiter,
    pub auth: Arc<AuthSettings>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, email: EmailSender, auth: AuthSettings) -> Self {
        let limits = RateLimitConfig::from_env();
        Self {
            pool,
            email: Arc::new(email),
            login_limiter: RateLimiter::new(limits),
            reset_limiter: RateLimiter::new(limits),
            auth: Arc::new(auth),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
