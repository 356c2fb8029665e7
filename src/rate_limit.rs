use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory rate limiter keyed by (bucket, ip_hash).
/// Each bucket (e.g. "login", "contact") has its own max attempts and window.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt and return true if the attempt is allowed (under the limit).
    /// `key` should be something like "login:<ip_hash>" or "contact:<ip_hash>".
    /// `max_attempts` is the maximum number of attempts allowed within `window`.
    pub fn check_and_record(&self, key: &str, max_attempts: u64, window: Duration) -> bool {
        let mut map = self.entries.lock().unwrap();
        let now = Instant::now();
        let cutoff = now - window;

        let attempts = map.entry(key.to_string()).or_default();

        // Prune old entries outside the window
        attempts.retain(|t| *t > cutoff);

        if (attempts.len() as u64) < max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit_then_blocks() {
        let limiter = RateLimiter::new();
        let window = Duration::from_secs(60);
        assert!(limiter.check_and_record("login:abc", 3, window));
        assert!(limiter.check_and_record("login:abc", 3, window));
        assert!(limiter.check_and_record("login:abc", 3, window));
        assert!(!limiter.check_and_record("login:abc", 3, window));
    }

    #[test]
    fn test_buckets_are_independent() {
        let limiter = RateLimiter::new();
        let window = Duration::from_secs(60);
        assert!(limiter.check_and_record("login:a", 1, window));
        assert!(!limiter.check_and_record("login:a", 1, window));
        assert!(limiter.check_and_record("login:b", 1, window));
    }

    #[test]
    fn test_window_expiry_readmits() {
        let limiter = RateLimiter::new();
        let window = Duration::from_millis(10);
        assert!(limiter.check_and_record("k", 1, window));
        assert!(!limiter.check_and_record("k", 1, window));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check_and_record("k", 1, window));
    }
}
