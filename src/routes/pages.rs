//! Page routes.

use axum::extract::Query;
use axum::response::{Html, Redirect};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::error::ApiError;
use crate::pages;

/// `GET /`: landing page.
pub async fn home() -> Html<String> {
    Html(pages::render_home())
}

/// `GET /login` and `GET /register`: the browser forms are not served here;
/// send visitors back to the landing page.
pub async fn redirect_home() -> Redirect {
    Redirect::temporary("/")
}

#[derive(Deserialize)]
pub struct ResetLinkQuery {
    #[serde(default)]
    pub token: String,
}

/// `GET /reset-password?token=`: the page the emailed reset link opens.
pub async fn reset_form(
    WithRejection(Query(query), _): WithRejection<Query<ResetLinkQuery>, ApiError>,
) -> Html<String> {
    Html(pages::render_reset_password(&query.token, None))
}
