use std::sync::Arc;
use std::time::Duration;

use leadhook::rate_limit::{ManualClock, SlidingWindowLimiter};

const WINDOW: Duration = Duration::from_millis(60_000);

fn limiter() -> (SlidingWindowLimiter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (SlidingWindowLimiter::with_clock(clock.clone()), clock)
}

#[test]
fn allows_up_to_max_then_denies() {
    let (limiter, _clock) = limiter();

    assert!(limiter.is_allowed("k", 3, WINDOW));
    assert!(limiter.is_allowed("k", 3, WINDOW));
    assert!(limiter.is_allowed("k", 3, WINDOW));
    assert!(!limiter.is_allowed("k", 3, WINDOW));
}

#[test]
fn allows_again_once_first_attempt_ages_out() {
    let (limiter, clock) = limiter();

    assert!(limiter.is_allowed("k", 3, WINDOW));
    clock.advance(Duration::from_millis(10));
    assert!(limiter.is_allowed("k", 3, WINDOW));
    assert!(limiter.is_allowed("k", 3, WINDOW));
    assert!(!limiter.is_allowed("k", 3, WINDOW));

    clock.advance(Duration::from_millis(59_991));
    assert!(limiter.is_allowed("k", 3, WINDOW));
    // The other two are still inside the window.
    assert!(!limiter.is_allowed("k", 3, WINDOW));
}

#[test]
fn denied_attempts_are_not_recorded() {
    let (limiter, clock) = limiter();

    assert!(limiter.is_allowed("k", 1, WINDOW));
    clock.advance(Duration::from_millis(30_000));
    assert!(!limiter.is_allowed("k", 1, WINDOW));
    clock.advance(Duration::from_millis(30_000));
    // Only the first attempt counted, and it just left the window.
    assert!(limiter.is_allowed("k", 1, WINDOW));
}

#[test]
fn keys_are_independent() {
    let (limiter, _clock) = limiter();

    assert!(limiter.is_allowed("a", 1, WINDOW));
    assert!(!limiter.is_allowed("a", 1, WINDOW));
    assert!(limiter.is_allowed("b", 1, WINDOW));
}

#[test]
fn retry_after_counts_down_from_oldest_attempt() {
    let (limiter, clock) = limiter();

    assert_eq!(limiter.retry_after("k", 2, WINDOW), Duration::ZERO);
    limiter.is_allowed("k", 2, WINDOW);
    clock.advance(Duration::from_secs(20));
    limiter.is_allowed("k", 2, WINDOW);

    assert_eq!(limiter.retry_after("k", 2, WINDOW), Duration::from_secs(40));
}

#[test]
fn cleanup_drops_stale_keys_only() {
    let (limiter, clock) = limiter();

    limiter.is_allowed("old", 3, WINDOW);
    clock.advance(Duration::from_secs(45));
    limiter.is_allowed("fresh", 3, WINDOW);
    clock.advance(Duration::from_secs(20));

    limiter.cleanup(WINDOW);
    assert_eq!(limiter.tracked_keys(), 1);
    assert!(limiter.is_allowed("fresh", 2, WINDOW));
    assert!(!limiter.is_allowed("fresh", 2, WINDOW));
}
