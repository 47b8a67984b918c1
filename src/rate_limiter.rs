//! Lossy attempt gate enforcing a minimum spacing between deliveries.
use std::{
    fmt,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

pub type Clock = Box<dyn Fn() -> Instant + Send + Sync>;

/// Decides whether a delivery attempt may proceed.
///
/// Every call records its timestamp as the last attempt, whether or not the
/// attempt is allowed. Attempts inside the interval are refused and the
/// caller drops the chunk; nothing is queued.
pub struct RateLimiter {
    interval: Option<Duration>,
    last_attempt: Mutex<Option<Instant>>,
    clock: Clock,
}

impl RateLimiter {
    /// Create a limiter reading the monotonic system clock.
    ///
    /// `None` disables limiting.
    pub fn new(interval: Option<Duration>) -> Self {
        Self::with_clock(interval, Box::new(Instant::now))
    }

    /// Create a limiter reading time from `clock`.
    pub fn with_clock(interval: Option<Duration>, clock: Clock) -> Self {
        Self {
            interval,
            last_attempt: Mutex::new(None),
            clock,
        }
    }

    /// Gate an attempt happening now.
    pub fn should_send(&self) -> bool {
        let now = (self.clock)();
        self.should_send_at(now)
    }

    /// Gate an attempt happening at `now`.
    pub fn should_send_at(&self, now: Instant) -> bool {
        let mut last = self.last_attempt.lock();
        let previous = last.replace(now);
        match (self.interval, previous) {
            (None, _) | (Some(_), None) => true,
            (Some(interval), Some(prev)) => now.saturating_duration_since(prev) >= interval,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .field("last_attempt", &*self.last_attempt.lock())
            .finish()
    }
}
