use super::*;

fn small_config() -> RateLimitConfig {
    RateLimitConfig {
        per_key_limit: 3,
        per_key_window: Duration::from_secs(60),
        global_limit: 5,
        global_window: Duration::from_secs(60),
    }
}

#[test]
fn per_key_allows_up_to_limit() {
    let rl = RateLimiter::new(small_config());
    let now = Instant::now();

    for i in 0..3 {
        assert!(rl.check_and_record_at("a@example.com", now).is_ok(), "attempt {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at("a@example.com", now),
        Err(RateLimitError::PerKeyExceeded { limit: 3, window_secs: 60 })
    ));
}

#[test]
fn global_allows_up_to_limit() {
    let rl = RateLimiter::new(small_config());
    let now = Instant::now();

    // Distinct keys so the per-key limit never trips first.
    for i in 0..5 {
        assert!(rl.check_and_record_at(&format!("user{i}@example.com"), now).is_ok());
    }
    assert!(matches!(
        rl.check_and_record_at("late@example.com", now),
        Err(RateLimitError::GlobalExceeded { limit: 5, .. })
    ));
}

#[test]
fn window_expiry_allows_new_attempts() {
    let rl = RateLimiter::new(small_config());
    let start = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at("a@example.com", start).unwrap();
    }
    assert!(rl.check_and_record_at("a@example.com", start).is_err());

    let after_window = start + Duration::from_secs(60) + Duration::from_millis(1);
    assert!(rl.check_and_record_at("a@example.com", after_window).is_ok());
}

#[test]
fn distinct_keys_do_not_interfere() {
    let rl = RateLimiter::new(small_config());
    let now = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at("a@example.com", now).unwrap();
    }
    assert!(rl.check_and_record_at("a@example.com", now).is_err());
    assert!(rl.check_and_record_at("b@example.com", now).is_ok());
}

#[test]
fn reset_clears_key() {
    let rl = RateLimiter::new(small_config());
    let now = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at("a@example.com", now).unwrap();
    }
    rl.reset("a@example.com");
    assert!(rl.check_and_record_at("a@example.com", now).is_ok());
}

#[test]
fn rejected_attempts_are_not_recorded() {
    let rl = RateLimiter::new(small_config());
    let start = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at("a@example.com", start).unwrap();
    }
    for _ in 0..10 {
        assert!(rl.check_and_record_at("a@example.com", start).is_err());
    }
    // Only the three accepted attempts count against the global window.
    assert!(rl.check_and_record_at("b@example.com", start).is_ok());
    assert!(rl.check_and_record_at("c@example.com", start).is_ok());
}

#[test]
fn prune_drops_expired_keys() {
    let rl = RateLimiter::new(small_config());
    let start = Instant::now();
    rl.check_and_record_at("a@example.com", start).unwrap();

    rl.prune_at(start + Duration::from_secs(61));
    let inner = rl.inner.lock().unwrap();
    assert!(inner.key_attempts.is_empty());
    assert!(inner.global_attempts.is_empty());
}

#[test]
fn default_config_matches_documented_limits() {
    let cfg = RateLimitConfig::default();
    assert_eq!(cfg.per_key_limit, 5);
    assert_eq!(cfg.per_key_window, Duration::from_secs(300));
    assert_eq!(cfg.global_limit, 100);
    assert_eq!(cfg.global_window, Duration::from_secs(60));
}
