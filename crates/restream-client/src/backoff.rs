//! Exponential backoff schedule for connection attempts.

use std::time::Duration;

/// Configuration for the connect-with-retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the second attempt (the first happens immediately).
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub multiplier: f64,
    /// Ceiling on the delay between attempts.
    pub max_delay: Duration,
    /// Total number of attempts before giving up.
    pub max_attempts: u32,
    /// Jitter factor in `[0.0, 1.0]`, applied as a uniform ±factor on each
    /// delay so simultaneous clients do not reconnect in lockstep.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            max_attempts: 5,
            jitter: 0.25,
        }
    }
}

/// Tracks attempts and computes the delay before the next one.
#[derive(Debug)]
pub struct Backoff {
    config: RetryConfig,
    attempts: u32,
    current_delay: Duration,
}

impl Backoff {
    /// Start a fresh schedule.
    pub fn new(config: RetryConfig) -> Self {
        let initial = config.initial_delay;
        Self {
            config,
            attempts: 0,
            current_delay: initial,
        }
    }

    /// Record a failed attempt and return the delay to wait before the next
    /// one, or `None` once the attempt budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.attempts >= self.config.max_attempts {
            return None;
        }

        let base = self.current_delay;
        self.current_delay = Duration::from_secs_f64(
            (base.as_secs_f64() * self.config.multiplier)
                .min(self.config.max_delay.as_secs_f64()),
        );

        if self.config.jitter > 0.0 {
            use rand::Rng;
            let factor = rand::thread_rng()
                .gen_range((1.0 - self.config.jitter)..=(1.0 + self.config.jitter));
            Some(base.mul_f64(factor))
        } else {
            Some(base)
        }
    }

    /// Number of failed attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_jitter(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_millis(350),
            max_attempts,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_delays_double_up_to_the_cap() {
        let mut backoff = Backoff::new(config_without_jitter(10));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(350)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(350)));
    }

    #[test]
    fn test_budget_is_bounded() {
        let mut backoff = Backoff::new(config_without_jitter(3));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_none());
        assert_eq!(backoff.attempts(), 3);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let config = RetryConfig {
            jitter: 0.5,
            ..config_without_jitter(100)
        };
        let mut backoff = Backoff::new(config);
        let delay = backoff.next_delay().unwrap();
        assert!(delay >= Duration::from_millis(50), "delay {delay:?}");
        assert!(delay <= Duration::from_millis(150), "delay {delay:?}");
    }
}
