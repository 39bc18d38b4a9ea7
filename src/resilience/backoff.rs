use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Exponential backoff schedule for retrying provider calls.
///
/// Delays double per attempt and are capped at `max_delay`. Jitter, when
/// requested, adds up to one extra second so concurrent retries spread out.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self { max_retries, base_delay, max_delay }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }

    /// Delay before retrying after attempt `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// [`delay`](Self::delay) plus a random 0..1s component.
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let jitter = rand::rng().random_range(0.0..1.0);
        self.delay(attempt) + Duration::from_secs_f64(jitter)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = BackoffPolicy::new(3, Duration::from_millis(100), Duration::from_secs(10));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_caps_at_max() {
        let policy = BackoffPolicy::new(3, Duration::from_secs(1), Duration::from_secs(4));
        assert_eq!(policy.delay(10), Duration::from_secs(4));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let policy = BackoffPolicy::default();
        // Shifting past 31 bits must not wrap back to short delays.
        assert_eq!(policy.delay(64), policy.max_delay);
    }

    #[test]
    fn test_jitter_stays_under_one_second() {
        let policy = BackoffPolicy::new(3, Duration::from_millis(100), Duration::from_secs(10));
        for attempt in 0..3 {
            let base = policy.delay(attempt);
            let jittered = policy.delay_with_jitter(attempt);
            assert!(jittered >= base);
            assert!(jittered < base + Duration::from_secs(1));
        }
    }

    #[test]
    fn test_default_matches_retry_defaults() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_from_config() {
        let cfg = RetryConfig {
            max_retries: 5,
            base_delay_ms: 250,
            max_delay_ms: 8_000,
        };
        let policy = BackoffPolicy::from_config(&cfg);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay(0), Duration::from_millis(250));
        assert_eq!(policy.delay(10), Duration::from_secs(8));
    }
}
