use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use http_output::rate_limiter::RateLimiter;

fn mock_clock(base: Instant, elapsed_ms: Arc<AtomicU64>) -> impl Fn() -> Instant {
    move || base + Duration::from_millis(elapsed_ms.load(Ordering::Relaxed))
}

#[test]
fn rate_limiter_gates_on_attempt_time() {
    let elapsed = Arc::new(AtomicU64::new(0));
    let limiter = RateLimiter::with_clock(
        Some(Duration::from_millis(1200)),
        Box::new(mock_clock(Instant::now(), elapsed.clone())),
    );

    // First attempt always passes
    assert!(limiter.should_send());

    // Back-to-back attempt is dropped
    elapsed.store(5, Ordering::Relaxed);
    assert!(!limiter.should_send());

    // 1200ms after the first attempt is still inside the window of the second
    elapsed.store(1200, Ordering::Relaxed);
    assert!(!limiter.should_send());

    // A full interval after the previous attempt passes again
    elapsed.store(2400, Ordering::Relaxed);
    assert!(limiter.should_send());
}

#[test]
fn unlimited_limiter_never_refuses() {
    let elapsed = Arc::new(AtomicU64::new(0));
    let limiter = RateLimiter::with_clock(None, Box::new(mock_clock(Instant::now(), elapsed)));
    assert!((0..10).all(|_| limiter.should_send()));
    assert_eq!(limiter.interval(), None);
}

#[test]
fn concurrent_attempts_admit_exactly_one() {
    let limiter = Arc::new(RateLimiter::new(Some(Duration::from_secs(60))));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            std::thread::spawn(move || limiter.should_send())
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .filter(|&allowed| allowed)
        .count();
    assert_eq!(admitted, 1);
}
