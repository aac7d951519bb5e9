use client_throttle::infrastructure::mocks::MockClock;
use client_throttle::{Decision, InMemoryCache, RequestInfo, Throttle};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

const BASE: u64 = 1_700_000_000;

fn test_clock() -> Arc<MockClock> {
    Arc::new(MockClock::new(UNIX_EPOCH + Duration::from_secs(BASE)))
}

fn blacklisting_throttle(limit: u32, threshold: u32, clock: &Arc<MockClock>) -> Throttle {
    Throttle::builder()
        .with_limit(limit)
        .with_window(Duration::from_secs(60))
        .with_blacklist_threshold(threshold)
        .with_clock(clock.clone())
        .build()
        .unwrap()
}

fn request(address: &str) -> RequestInfo {
    RequestInfo {
        source_address: Some(address.to_string()),
        user_agent: "integration-test/1.0".to_string(),
        method: "POST".to_string(),
        path: "/api/login".to_string(),
    }
}

fn violations_of(decision: &Decision) -> (Option<u32>, bool) {
    match decision {
        Decision::RateLimited {
            violations,
            escalated,
            ..
        } => (*violations, *escalated),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_violations_accumulate_across_denials() {
    let clock = test_clock();
    let throttle = blacklisting_throttle(1, 3, &clock);
    let request = request("198.51.100.1");

    assert!(throttle.check(&request).await.unwrap().is_allowed());

    // Each denial records one violation; the third reaches the threshold
    let first = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&first), (Some(1), false));

    let second = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&second), (Some(2), false));

    let third = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&third), (Some(3), true));
}

#[tokio::test]
async fn test_escalating_denial_is_still_a_429() {
    let clock = test_clock();
    let throttle = blacklisting_throttle(1, 1, &clock);
    let request = request("198.51.100.2");

    assert!(throttle.check(&request).await.unwrap().is_allowed());

    // The denial that triggers the blacklist is itself reported as rate
    // limited; the 403 starts with the next request
    let escalating = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&escalating), (Some(1), true));
    assert_eq!(escalating.status(), Some(429));
    assert_eq!(
        escalating.body(),
        Some("Too many requests, please try again later.")
    );

    let blocked = throttle.check(&request).await.unwrap();
    assert_eq!(blocked, Decision::Blacklisted);
    assert_eq!(blocked.status(), Some(403));
    assert_eq!(
        blocked.body(),
        Some(r#"{"error":"Access denied due to repeated rate limit violations"}"#)
    );
    assert!(blocked.headers().is_empty());
}

#[tokio::test]
async fn test_blacklist_outlives_windows() {
    let clock = test_clock();
    let throttle = blacklisting_throttle(1, 1, &clock);
    let request = request("198.51.100.3");

    throttle.check(&request).await.unwrap();
    throttle.check(&request).await.unwrap();
    assert!(throttle.check(&request).await.unwrap().is_blacklisted());

    // A hundred idle windows later the flag still holds
    clock.advance(Duration::from_secs(6_000));
    assert!(throttle.check(&request).await.unwrap().is_blacklisted());

    let snapshot = throttle.metrics().snapshot();
    assert_eq!(snapshot.blacklist_hits, 2);
}

#[tokio::test]
async fn test_violations_expire_without_reinforcement() {
    let clock = test_clock();
    let throttle = blacklisting_throttle(1, 2, &clock);
    let request = request("198.51.100.4");

    assert!(throttle.check(&request).await.unwrap().is_allowed());
    clock.advance(Duration::from_secs(1));
    let first = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&first), (Some(1), false));

    // Violations are kept for two windows; stay quiet longer than that
    clock.advance(Duration::from_secs(121));
    assert!(throttle.check(&request).await.unwrap().is_allowed());

    // The count started over instead of reaching the threshold
    let next = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&next), (Some(1), false));
}

#[tokio::test]
async fn test_repeat_offender_is_caught_across_windows() {
    let clock = test_clock();
    let throttle = blacklisting_throttle(1, 2, &clock);
    let request = request("198.51.100.5");

    assert!(throttle.check(&request).await.unwrap().is_allowed());
    let first = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&first), (Some(1), false));

    // One window later the violation record (two-window lifetime) survives
    clock.advance(Duration::from_secs(61));
    assert!(throttle.check(&request).await.unwrap().is_allowed());
    let second = throttle.check(&request).await.unwrap();
    assert_eq!(violations_of(&second), (Some(2), true));

    assert!(throttle.check(&request).await.unwrap().is_blacklisted());
}

#[tokio::test]
async fn test_no_violation_tracking_without_threshold() {
    let clock = test_clock();
    let throttle = Throttle::builder()
        .with_limit(1)
        .with_window(Duration::from_secs(60))
        .with_clock(clock.clone())
        .build()
        .unwrap();
    let request = request("198.51.100.6");

    throttle.check(&request).await.unwrap();

    // Abuse for ten straight windows; the client is denied but never flagged
    for _ in 0..10 {
        for _ in 0..5 {
            let denied = throttle.check(&request).await.unwrap();
            assert_eq!(violations_of(&denied), (None, false));
        }
        clock.advance(Duration::from_secs(61));
        assert!(throttle.check(&request).await.unwrap().is_allowed());
    }
}

#[tokio::test]
async fn test_stale_mark_ignored_when_blacklisting_disabled() {
    let clock = test_clock();
    let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
    let request = request("198.51.100.7");

    let enforcing = Throttle::builder()
        .with_limit(1)
        .with_window(Duration::from_secs(60))
        .with_blacklist_threshold(1)
        .with_cache(cache.clone())
        .with_clock(clock.clone())
        .build()
        .unwrap();

    enforcing.check(&request).await.unwrap();
    enforcing.check(&request).await.unwrap();
    assert!(enforcing.check(&request).await.unwrap().is_blacklisted());

    // Same storage, blacklisting turned off: the mark is simply not consulted
    let lenient = Throttle::builder()
        .with_limit(5)
        .with_window(Duration::from_secs(60))
        .with_cache(cache.clone())
        .with_clock(clock.clone())
        .build()
        .unwrap();

    assert!(lenient.check(&request).await.unwrap().is_allowed());
}

#[tokio::test]
async fn test_only_the_offending_client_is_blacklisted() {
    let clock = test_clock();
    let throttle = blacklisting_throttle(1, 1, &clock);
    let offender = request("198.51.100.8");
    let bystander = request("198.51.100.9");

    throttle.check(&offender).await.unwrap();
    throttle.check(&offender).await.unwrap();
    assert!(throttle.check(&offender).await.unwrap().is_blacklisted());

    assert!(throttle.check(&bystander).await.unwrap().is_allowed());
}
