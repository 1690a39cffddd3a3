//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the server-rendered landing page at `/` and the
//! JSON API (auth, users, ads) beside it. `AppState` is attached once here and
//! reaches every handler through the `State` extractor.

pub mod ads;
pub mod auth;
pub mod error;
pub mod pages;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Directory holding the compiled stylesheet served at `/style`.
fn style_dir() -> PathBuf {
    std::env::var("STYLE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("style"))
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::redirect_home))
        .route("/register", get(pages::redirect_home).post(auth::register))
        .route("/token", post(auth::token))
        .route("/logout", post(auth::logout))
        .route("/users/me", get(auth::me))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", get(pages::reset_form).post(auth::reset_password))
        .route("/ads", get(ads::list_ads).post(ads::create_ad))
        .route(
            "/ads/{id}",
            get(ads::get_ad)
                .put(ads::update_ad)
                .delete(ads::delete_ad),
        )
        .route("/ads/{id}/approve", post(ads::approve_ad))
        .route("/healthz", get(healthz))
        .nest_service("/style", ServeDir::new(style_dir()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
