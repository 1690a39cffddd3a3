use super::*;
use crate::services::password::PasswordError;

#[test]
fn hash_reset_token_is_stable_and_hex() {
    let a = hash_reset_token("abc123");
    let b = hash_reset_token("abc123");
    let c = hash_reset_token("abc124");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn hash_reset_token_ignores_surrounding_whitespace() {
    assert_eq!(hash_reset_token(" abc123\n"), hash_reset_token("abc123"));
}

#[test]
fn reset_link_joins_base_without_double_slash() {
    assert_eq!(
        reset_link("https://limpopo.example/", "tok"),
        "https://limpopo.example/reset-password?token=tok"
    );
    assert_eq!(reset_link("http://localhost:3000", "tok"), "http://localhost:3000/reset-password?token=tok");
}

#[tokio::test]
async fn redeem_rejects_blank_token_without_db() {
    let state = crate::state::test_helpers::test_app_state();
    let err = redeem_reset_token(&state.pool, "   ", "new-password-1").await.unwrap_err();
    assert!(matches!(err, ResetError::InvalidToken));
}

#[tokio::test]
async fn redeem_rejects_weak_password_before_consuming() {
    let state = crate::state::test_helpers::test_app_state();
    let err = redeem_reset_token(&state.pool, "sometoken", "short").await.unwrap_err();
    assert!(matches!(err, ResetError::User(UserError::Password(PasswordError::TooShort))));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn reset_token_is_single_use_and_revokes_sessions() {
    let pool = crate::services::test_support::integration_pool().await;
    let user = user::create_user(&pool, "palesa", "palesa@example.com", "original-pass").await.unwrap();
    let session_token = session::create_session(&pool, user.id, Duration::hours(1)).await.unwrap();

    let token = issue_reset_token(&pool, user.id, Duration::minutes(30)).await.unwrap();
    let redeemed = redeem_reset_token(&pool, &token, "brand-new-pass").await.unwrap();
    assert_eq!(redeemed, user.id);

    assert!(session::validate_session(&pool, &session_token).await.unwrap().is_none());
    assert!(user::authenticate(&pool, "palesa@example.com", "brand-new-pass").await.unwrap().is_some());

    let again = redeem_reset_token(&pool, &token, "another-pass").await.unwrap_err();
    assert!(matches!(again, ResetError::InvalidToken));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn failed_redeem_rolls_back_and_keeps_token_usable() {
    use crate::services::test_support;

    let pool = test_support::integration_pool().await;
    let user = user::create_user(&pool, "tumelo", "tumelo@example.com", "original-pass").await.unwrap();
    let session_token = session::create_session(&pool, user.id, Duration::hours(1)).await.unwrap();
    let token = issue_reset_token(&pool, user.id, Duration::minutes(30)).await.unwrap();

    // Session revocation is the last write; make it fail after the token is consumed.
    test_support::fail_session_deletes(&pool).await;
    let err = redeem_reset_token(&pool, &token, "brand-new-pass").await.unwrap_err();
    test_support::allow_session_deletes(&pool).await;
    assert!(matches!(err, ResetError::Db(_)));

    assert!(user::authenticate(&pool, "tumelo@example.com", "original-pass").await.unwrap().is_some());
    assert!(session::validate_session(&pool, &session_token).await.unwrap().is_some());

    let redeemed = redeem_reset_token(&pool, &token, "brand-new-pass").await.unwrap();
    assert_eq!(redeemed, user.id);
    assert!(user::authenticate(&pool, "tumelo@example.com", "brand-new-pass").await.unwrap().is_some());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn reissuing_invalidates_earlier_token() {
    let pool = crate::services::test_support::integration_pool().await;
    let user = user::create_user(&pool, "dineo", "dineo@example.com", "original-pass").await.unwrap();

    let first = issue_reset_token(&pool, user.id, Duration::minutes(30)).await.unwrap();
    let second = issue_reset_token(&pool, user.id, Duration::minutes(30)).await.unwrap();

    assert!(matches!(redeem_reset_token(&pool, &first, "brand-new-pass").await, Err(ResetError::InvalidToken)));
    redeem_reset_token(&pool, &second, "brand-new-pass").await.unwrap();
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn expired_token_is_rejected() {
    let pool = crate::services::test_support::integration_pool().await;
    let user = user::create_user(&pool, "refilwe", "refilwe@example.com", "original-pass").await.unwrap();

    let token = issue_reset_token(&pool, user.id, Duration::seconds(-1)).await.unwrap();
    assert!(matches!(redeem_reset_token(&pool, &token, "brand-new-pass").await, Err(ResetError::InvalidToken)));
}
