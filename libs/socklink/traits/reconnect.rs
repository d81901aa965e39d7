use std::time::Duration;

/// Decides when a transport retries after losing its connection
///
/// The connection manager never consults a strategy itself; it only
/// observes the `reconnecting` / `reconnect` / `reconnect_failed` events
/// that a transport emits while following one.
pub trait ReconnectionStrategy: Send + Sync {
    /// Delay before reconnection attempt `attempt` (0-indexed)
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long, then try again
    /// * `None` - Give up; the transport reports `reconnect_failed`
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    /// Reset any internal state after a successful connection
    fn reset(&mut self);

    /// Whether attempt number `attempt` is still allowed
    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// Exponential backoff: `initial_delay * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff strategy
    ///
    /// # Arguments
    /// * `initial_delay` - Delay before the first reconnection attempt
    /// * `max_delay` - Upper bound for any single delay
    /// * `max_attempts` - Maximum number of attempts (None = unlimited)
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let factor = 2u32.checked_pow(attempt.min(u32::MAX as usize) as u32).unwrap_or(u32::MAX);
        let delay = self
            .initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }

    fn reset(&mut self) {}

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Never reconnect; used when `reconnection` is disabled
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}
