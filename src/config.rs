//! Server configuration parsed from environment variables.
//!
//! `main` loads `.env` (if present) before calling [`AppConfig::from_env`], so
//! every setting can live in either place.

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Resend credentials; both must be present to enable real delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub session_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub cookie_secure: bool,
    pub public_base_url: String,
    pub resend: Option<ResendConfig>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `SESSION_TTL_HOURS`: default 168
    /// - `RESET_TOKEN_TTL_MINUTES`: default 30
    /// - `COOKIE_SECURE`: default false
    /// - `PUBLIC_BASE_URL`: default `http://localhost:3000`
    /// - `RESEND_API_KEY` + `RESEND_FROM`: enable email delivery
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DATABASE_URL` is unset or a numeric/boolean
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let port = env_parse("PORT", DEFAULT_PORT)?;
        let db_max_connections = env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let session_ttl_hours = env_parse("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let reset_token_ttl_minutes = env_parse("RESET_TOKEN_TTL_MINUTES", DEFAULT_RESET_TOKEN_TTL_MINUTES)?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", value: session_ttl_hours.to_string() });
        }
        if reset_token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "RESET_TOKEN_TTL_MINUTES",
                value: reset_token_ttl_minutes.to_string(),
            });
        }

        let cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            Err(_) => false,
        };

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let resend = match (std::env::var("RESEND_API_KEY"), std::env::var("RESEND_FROM")) {
            (Ok(api_key), Ok(from)) if !api_key.trim().is_empty() && !from.trim().is_empty() => {
                Some(ResendConfig { api_key, from })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            session_ttl_hours,
            reset_token_ttl_minutes,
            cookie_secure,
            public_base_url,
            resend,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
