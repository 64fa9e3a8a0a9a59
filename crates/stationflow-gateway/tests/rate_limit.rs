#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{FixedOffset, TimeZone};
use stationflow_core::clock::ManualClock;
use stationflow_gateway::policy::RateLimiter;

fn clock() -> Arc<ManualClock> {
    let tz = FixedOffset::east_opt(0).unwrap();
    Arc::new(ManualClock::new(tz.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()))
}

#[test]
fn max_calls_per_window_then_denied() {
    let clock = clock();
    let lim = RateLimiter::new(5, Duration::from_secs(3600), clock.clone());

    for i in 0..5 {
        assert!(lim.allow("ip:1"), "call {i} should pass");
    }
    assert!(!lim.allow("ip:1"), "6th call within the window must be denied");

    clock.advance(chrono::Duration::minutes(59));
    assert!(!lim.allow("ip:1"));
}

#[test]
fn window_refills_wholesale_only_after_it_elapses() {
    let clock = clock();
    let lim = RateLimiter::new(2, Duration::from_secs(60), clock.clone());

    assert!(lim.allow("k"));
    assert!(lim.allow("k"));
    assert!(!lim.allow("k"));

    // Exactly one window is not "elapsed".
    clock.advance(chrono::Duration::seconds(60));
    assert!(!lim.allow("k"));

    clock.advance(chrono::Duration::seconds(1));
    assert!(lim.allow("k"));
    assert!(lim.allow("k"));
    assert!(!lim.allow("k"));
}

#[test]
fn keys_are_independent() {
    let clock = clock();
    let lim = RateLimiter::new(1, Duration::from_secs(60), clock);

    assert!(lim.allow("user:a"));
    assert!(!lim.allow("user:a"));
    assert!(lim.allow("user:b"));
    assert_eq!(lim.len(), 2);
}

#[test]
fn clock_going_backwards_does_not_refill() {
    let clock = clock();
    let lim = RateLimiter::new(1, Duration::from_secs(60), clock.clone());

    assert!(lim.allow("k"));
    clock.advance(chrono::Duration::hours(-2));
    assert!(!lim.allow("k"));
}

#[test]
fn concurrent_callers_share_one_bucket() {
    let clock = clock();
    let lim = Arc::new(RateLimiter::new(50, Duration::from_secs(3600), clock));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let lim = Arc::clone(&lim);
            thread::spawn(move || (0..25).filter(|_| lim.allow("shared")).count())
        })
        .collect();

    let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(allowed, 50);
}
