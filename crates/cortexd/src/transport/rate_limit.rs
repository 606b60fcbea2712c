//! Fixed-window admission control for incoming requests.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

const WINDOW: Duration = Duration::from_secs(1);

/// Counts requests in one-second windows shared by every connection.
///
/// The limit is supplied on each call rather than stored, so a reloaded
/// `rate_limit.max_requests_per_sec` applies from the next request on.
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<Window>,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    admitted: u32,
}

impl RateLimiter {
    /// Creates a limiter whose first window starts now.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(started: Instant) -> Self {
        Self {
            window: Mutex::new(Window {
                started,
                admitted: 0,
            }),
        }
    }

    /// Admits one request if fewer than `limit` were admitted this window.
    pub fn try_acquire(&self, limit: u32) -> bool {
        self.try_acquire_at(Instant::now(), limit)
    }

    fn try_acquire_at(&self, now: Instant, limit: u32) -> bool {
        let mut window = self.window.lock();
        if now.saturating_duration_since(window.started) >= WINDOW {
            window.started = now;
            window.admitted = 0;
        }
        if window.admitted >= limit {
            return false;
        }
        window.admitted += 1;
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(100)]
    fn admits_up_to_limit_per_window(#[case] limit: u32) {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(start);
        for _ in 0..limit {
            assert!(limiter.try_acquire_at(start, limit));
        }
        assert!(!limiter.try_acquire_at(start + Duration::from_millis(999), limit));
    }

    #[test]
    fn next_window_resets_the_count() {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(start);
        assert!(limiter.try_acquire_at(start, 1));
        assert!(!limiter.try_acquire_at(start, 1));
        assert!(limiter.try_acquire_at(start + WINDOW, 1));
    }

    #[test]
    fn raised_limit_applies_immediately() {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(start);
        assert!(limiter.try_acquire_at(start, 1));
        assert!(!limiter.try_acquire_at(start, 1));
        assert!(limiter.try_acquire_at(start, 2));
    }
}
