//! crates/mindful_core/src/rate_limit.rs
//!
//! A fixed-window attempt counter keyed by an identifier (usually an email).
//! Counters live in memory only and reset when the process restarts.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Attempt {
    count: u32,
    window_start: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: NonZeroU32,
    window: Duration,
    attempts: Mutex<HashMap<String, Attempt>>,
}

impl RateLimiter {
    pub fn new(max_attempts: NonZeroU32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts an attempt for `identifier` and reports whether it is allowed.
    ///
    /// Every call first drops all entries whose window has run out. The purge
    /// walks the whole map; the identifiers seen per process are few.
    pub fn check(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);

        attempts.retain(|_, attempt| now.duration_since(attempt.window_start) < self.window);

        if let Some(attempt) = attempts.get_mut(identifier) {
            if attempt.count >= self.max_attempts.get() {
                return false;
            }
            attempt.count += 1;
            return true;
        }

        attempts.insert(
            identifier.to_string(),
            Attempt {
                count: 1,
                window_start: now,
            },
        );
        true
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            NonZeroU32::new(max).unwrap(),
            Duration::from_secs(window_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn allows_up_to_max_then_denies() {
        let limiter = limiter(3, 60);
        assert!(limiter.check("a@example.com"));
        assert!(limiter.check("a@example.com"));
        assert!(limiter.check("a@example.com"));
        assert!(!limiter.check("a@example.com"));
        assert!(!limiter.check("a@example.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn identifiers_are_independent() {
        let limiter = limiter(1, 60);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn window_is_fixed_from_first_attempt() {
        let limiter = limiter(2, 60);
        assert!(limiter.check("a"));
        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));

        // 60s after the first attempt the window is over, whatever happened since.
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_purged_on_any_check() {
        let limiter = limiter(5, 30);
        limiter.check("a");
        limiter.check("b");
        assert_eq!(limiter.tracked(), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        limiter.check("c");
        assert_eq!(limiter.tracked(), 1);
    }
}
