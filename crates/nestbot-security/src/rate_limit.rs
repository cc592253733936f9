//! Per-user fixed cooldown.
//!
//! Not a token bucket: after an accepted message every further message from
//! that user is rejected until `window` has passed, then the next one is
//! accepted and restarts the window. Rejected messages do not extend it.

use nestbot_core::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Time source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Tracks the last accepted message per user.
pub struct RateLimiter {
    window: Duration,
    clock: Box<dyn Clock>,
    /// user id → last accepted instant. Entries are never evicted.
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given window on the system clock.
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Box::new(SystemClock))
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(Duration::from_secs(config.window_secs))
    }

    pub fn with_clock(window: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Check-and-record in one step: returns `true` if the user is still in
    /// cooldown, otherwise records now as their last accepted message.
    pub fn is_rate_limited(&self, user_id: &str) -> bool {
        let now = self.clock.now();
        // Lookup, comparison and update under one guard so two concurrent
        // messages from the same user cannot both pass.
        let mut table = self
            .last_accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = table.get(user_id) {
            if now.saturating_duration_since(*last) < self.window {
                return true;
            }
        }
        table.insert(user_id.to_string(), now);
        false
    }

    /// Number of users ever accepted.
    pub fn tracked_users(&self) -> usize {
        self.last_accepted
            .lock()
            .map(|t| t.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Clock that only moves when told to.
    #[derive(Clone)]
    struct ManualClock {
        start: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    fn limiter(clock: &ManualClock) -> RateLimiter {
        RateLimiter::with_clock(Duration::from_secs(20), Box::new(clock.clone()))
    }

    #[test]
    fn test_cooldown_cycle() {
        let clock = ManualClock::new();
        let rl = limiter(&clock);

        assert!(!rl.is_rate_limited("42"));
        clock.advance(Duration::from_secs(10));
        assert!(rl.is_rate_limited("42"));
        // The rejected call at t=10 must not restart the window.
        clock.advance(Duration::from_secs(10));
        assert!(!rl.is_rate_limited("42"));
    }

    #[test]
    fn test_rejections_do_not_extend_window() {
        let clock = ManualClock::new();
        let rl = limiter(&clock);

        assert!(!rl.is_rate_limited("u"));
        for _ in 0..19 {
            clock.advance(Duration::from_secs(1));
            assert!(rl.is_rate_limited("u"));
        }
        clock.advance(Duration::from_secs(1));
        assert!(!rl.is_rate_limited("u"));
    }

    #[test]
    fn test_users_are_independent() {
        let clock = ManualClock::new();
        let rl = limiter(&clock);

        assert!(!rl.is_rate_limited("alice"));
        assert!(!rl.is_rate_limited("bob"));
        assert!(rl.is_rate_limited("alice"));
        assert_eq!(rl.tracked_users(), 2);
    }

    #[test]
    fn test_concurrent_burst_admits_one() {
        let rl = Arc::new(RateLimiter::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let rl = rl.clone();
                std::thread::spawn(move || rl.is_rate_limited("same-user"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|limited| !limited)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_default_window() {
        assert_eq!(RateLimiter::default().window(), Duration::from_secs(20));
    }
}
