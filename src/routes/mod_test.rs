use super::*;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION, WWW_AUTHENTICATE};
use axum::http::{Method, Request};
use tower::ServiceExt;

use crate::state::test_helpers::test_app_state;

async fn send(router: Router, request: Request<Body>) -> axum::response::Response {
    router.oneshot(request).await.expect("router is infallible")
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_req(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn root_serves_landing_page_html() {
    let resp = send(app(test_app_state()), get_req("/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));
    let html = body_string(resp).await;
    assert!(html.contains("<title>LimpopoConnect 2.0</title>"));
    assert!(html.contains("Connect in Limpopo"));
}

#[tokio::test]
async fn healthz_is_ok() {
    let resp = send(app(test_app_state()), get_req("/healthz")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn browser_login_and_register_redirect_home() {
    for uri in ["/login", "/register"] {
        let resp = send(app(test_app_state()), get_req(uri)).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
    }
}

// =============================================================================
// Auth guard
// =============================================================================

#[tokio::test]
async fn users_me_without_token_is_401_with_challenge() {
    let resp = send(app(test_app_state()), get_req("/users/me")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body_json(resp).await["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn create_ad_requires_auth() {
    let body = serde_json::json!({
        "title": "Room to rent",
        "description": "Near the university",
        "category": "Classifieds",
        "location": "Mankweng"
    });
    let resp = send(app(test_app_state()), json_req(Method::POST, "/ads", body)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutating_ad_routes_require_auth() {
    let id = uuid::Uuid::new_v4();
    let update = json_req(Method::PUT, &format!("/ads/{id}"), serde_json::json!({ "title": "x" }));
    assert_eq!(send(app(test_app_state()), update).await.status(), StatusCode::UNAUTHORIZED);

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/ads/{id}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app(test_app_state()), delete).await.status(), StatusCode::UNAUTHORIZED);

    let approve = Request::builder()
        .method(Method::POST)
        .uri(format!("/ads/{id}/approve"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app(test_app_state()), approve).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_token_with_unreachable_db_is_500() {
    let req = Request::builder()
        .uri("/users/me")
        .header("authorization", "Bearer deadbeef")
        .body(Body::empty())
        .unwrap();
    let resp = send(app(test_app_state()), req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["detail"], "Internal server error");
}

// =============================================================================
// Validation before persistence
// =============================================================================

#[tokio::test]
async fn get_ad_with_malformed_id_is_400() {
    let resp = send(app(test_app_state()), get_req("/ads/not-a-uuid")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["detail"], "invalid ad id");
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let body = serde_json::json!({ "username": "neo", "email": "nope", "password": "long-enough-1" });
    let resp = send(app(test_app_state()), json_req(Method::POST, "/register", body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["detail"], "invalid email");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let body = serde_json::json!({ "username": "neo", "email": "neo@example.com", "password": "short" });
    let resp = send(app(test_app_state()), json_req(Method::POST, "/register", body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forgot_password_rejects_invalid_email() {
    let body = serde_json::json!({ "email": "not-an-email" });
    let resp = send(app(test_app_state()), json_req(Method::POST, "/forgot-password", body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_password_rejects_blank_token() {
    let body = serde_json::json!({ "token": "", "new_password": "long-enough-1" });
    let resp = send(app(test_app_state()), json_req(Method::POST, "/reset-password", body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["detail"], "invalid or expired reset token");
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn token_endpoint_is_rate_limited_per_email() {
    let state = test_app_state();
    let form = |password: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/token")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username=Victim%40example.com&password={password}")))
            .unwrap()
    };

    // Attempts within the limit reach the (unreachable) database.
    for i in 0..5 {
        let resp = send(app(state.clone()), form(&format!("guess{i}"))).await;
        assert_ne!(resp.status(), StatusCode::TOO_MANY_REQUESTS, "attempt {i}");
    }
    let resp = send(app(state.clone()), form("guess5")).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // Other accounts are unaffected.
    let other = Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=someone%40example.com&password=x"))
        .unwrap();
    assert_ne!(send(app(state), other).await.status(), StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// Password reset page
// =============================================================================

fn form_req(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn emailed_reset_link_opens_reset_form() {
    let link = crate::services::password_reset::reset_link("http://localhost:3000", "abc123");
    let path = link.strip_prefix("http://localhost:3000").unwrap();

    let resp = send(app(test_app_state()), get_req(path)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));
    let html = body_string(resp).await;
    assert!(html.contains(r#"action="/reset-password""#));
    assert!(html.contains(r#"value="abc123""#));
}

#[tokio::test]
async fn reset_form_submission_with_blank_token_reshows_form() {
    let resp = send(app(test_app_state()), form_req("/reset-password", "token=&new_password=long-enough-1")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_string(resp).await;
    assert!(html.contains("invalid or expired reset token"));
    assert!(html.contains(r#"name="new_password""#));
}

#[tokio::test]
async fn reset_form_submission_with_weak_password_keeps_token() {
    let resp = send(app(test_app_state()), form_req("/reset-password", "token=abc123&new_password=short")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_string(resp).await;
    assert!(html.contains("password must be at least 8 characters"));
    assert!(html.contains(r#"value="abc123""#));
}

// =============================================================================
// Malformed input keeps the error shape
// =============================================================================

async fn assert_detail_json(resp: axum::response::Response, expected_status: StatusCode, needle: &str) {
    assert_eq!(resp.status(), expected_status);
    let content_type = resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap().to_owned();
    assert!(content_type.starts_with("application/json"), "content-type was {content_type}");
    let body = body_json(resp).await;
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains(needle), "detail was {detail:?}");
}

#[tokio::test]
async fn register_missing_field_is_json_detail() {
    let body = serde_json::json!({ "username": "neo", "email": "neo@example.com" });
    let resp = send(app(test_app_state()), json_req(Method::POST, "/register", body)).await;
    assert_detail_json(resp, StatusCode::UNPROCESSABLE_ENTITY, "missing field `password`").await;
}

#[tokio::test]
async fn register_malformed_json_is_json_detail() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = send(app(test_app_state()), req).await;
    assert_detail_json(resp, StatusCode::BAD_REQUEST, "JSON").await;
}

#[tokio::test]
async fn token_form_missing_password_is_json_detail() {
    let resp = send(app(test_app_state()), form_req("/token", "username=neo%40example.com")).await;
    assert!(resp.status().is_client_error());
    let body = body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn ads_listing_bad_query_is_json_detail() {
    let resp = send(app(test_app_state()), get_req("/ads?skip=abc")).await;
    assert_detail_json(resp, StatusCode::BAD_REQUEST, "Failed to deserialize query string").await;
}

// =============================================================================
// Static assets
// =============================================================================

#[tokio::test]
async fn stylesheet_is_served() {
    let resp = send(app(test_app_state()), get_req("/style/site.css")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap().starts_with("text/css"));
    assert!(body_string(resp).await.contains(".bg-indigo-600"));
}

#[tokio::test]
async fn landing_page_links_served_stylesheet() {
    let html = body_string(send(app(test_app_state()), get_req("/")).await).await;
    assert!(html.contains(r#"href="/style/site.css""#));
    assert!(!html.contains("cdn.tailwindcss.com"));
}

// =============================================================================
// Live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
fn live_state(pool: sqlx::PgPool, email: crate::services::email::EmailSender) -> AppState {
    AppState::new(pool, email, crate::state::AuthSettings::default())
}

#[cfg(feature = "live-db-tests")]
fn bearer_req(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn logout_reports_failure_when_session_survives() {
    use crate::services::{email::EmailSender, session, test_support, user};

    let pool = test_support::integration_pool().await;
    let account = user::create_user(&pool, "kagiso", "kagiso@example.com", "kagiso-password").await.unwrap();
    let token = session::create_session(&pool, account.id, time::Duration::hours(1)).await.unwrap();
    let state = live_state(pool.clone(), EmailSender::Log);

    test_support::fail_session_deletes(&pool).await;
    let resp = send(app(state.clone()), bearer_req(Method::POST, "/logout", &token)).await;
    test_support::allow_session_deletes(&pool).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.headers().get(axum::http::header::SET_COOKIE).is_none());
    assert!(session::validate_session(&pool, &token).await.unwrap().is_some());

    let resp = send(app(state), bearer_req(Method::POST, "/logout", &token)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(session::validate_session(&pool, &token).await.unwrap().is_none());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn forgot_password_email_link_resets_password_end_to_end() {
    use std::sync::{Arc, Mutex};

    use crate::services::{email::EmailSender, test_support};

    let pool = test_support::integration_pool().await;
    let outbox = Arc::new(Mutex::new(Vec::new()));
    let state = live_state(pool, EmailSender::Outbox(outbox.clone()));

    let register = serde_json::json!({ "username": "mpho", "email": "mpho@example.com", "password": "first-password" });
    let resp = send(app(state.clone()), json_req(Method::POST, "/register", register)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let login = form_req("/token", "username=mpho%40example.com&password=first-password");
    let old_token = body_json(send(app(state.clone()), login).await).await["access_token"].as_str().unwrap().to_owned();

    let forgot = json_req(Method::POST, "/forgot-password", serde_json::json!({ "email": "mpho@example.com" }));
    assert_eq!(send(app(state.clone()), forgot).await.status(), StatusCode::OK);

    let html = outbox.lock().unwrap().pop().expect("reset email sent").html;
    let start = html.find("/reset-password?token=").expect("link in email");
    let path: String = html[start..]
        .chars()
        .take_while(|c| *c != '"' && *c != '<' && !c.is_whitespace())
        .collect();
    let reset_token = path.trim_start_matches("/reset-password?token=").to_owned();

    let page = body_string(send(app(state.clone()), get_req(&path)).await).await;
    assert!(page.contains(&format!(r#"value="{reset_token}""#)));

    let submit = form_req("/reset-password", &format!("token={reset_token}&new_password=second-password"));
    let resp = send(app(state.clone()), submit).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Password updated"));

    let resp = send(app(state.clone()), bearer_req(Method::GET, "/users/me", &old_token)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let old = form_req("/token", "username=mpho%40example.com&password=first-password");
    assert_eq!(send(app(state.clone()), old).await.status(), StatusCode::UNAUTHORIZED);
    let new = form_req("/token", "username=mpho%40example.com&password=second-password");
    assert_eq!(send(app(state), new).await.status(), StatusCode::OK);
}
