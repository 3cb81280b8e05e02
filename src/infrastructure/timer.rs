use std::time::Duration;

/// Reconnect budget with a fixed delay between attempts.
///
/// `attempts` only goes back to zero through [`reset`](Self::reset), which the
/// manager calls on a successful open. Once the budget is spent it stays spent.
#[derive(Debug, Clone)]
pub struct ReconnectTimer {
    attempts: u32,
    max_attempts: u32,
    interval: Duration,
    active: bool,
}

impl ReconnectTimer {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            interval,
            active: false,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the delay before the next reopen
    pub fn delay(&self) -> Duration {
        self.interval
    }

    /// Whether a reopen is currently scheduled
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Claims the next attempt number, or `None` once the budget is spent.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.is_exhausted() {
            self.active = false;
            return None;
        }
        self.attempts += 1;
        self.active = true;
        Some(self.attempts)
    }

    /// Marks the scheduled reopen as fired or cancelled
    pub fn clear(&mut self) {
        self.active = false;
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.active = false;
    }
}

impl Default for ReconnectTimer {
    fn default() -> Self {
        Self::new(
            crate::types::MAX_RECONNECT_ATTEMPTS,
            Duration::from_millis(crate::types::RECONNECT_INTERVAL),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_bounded() {
        let mut timer = ReconnectTimer::new(3, Duration::from_millis(10));
        assert_eq!(timer.next_attempt(), Some(1));
        assert_eq!(timer.next_attempt(), Some(2));
        assert_eq!(timer.next_attempt(), Some(3));
        assert!(timer.is_exhausted());
        assert_eq!(timer.next_attempt(), None);
        assert_eq!(timer.attempts(), 3);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_delay_is_constant() {
        let mut timer = ReconnectTimer::default();
        let first = timer.delay();
        timer.next_attempt();
        timer.next_attempt();
        assert_eq!(timer.delay(), first);
        assert_eq!(first, Duration::from_millis(3000));
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut timer = ReconnectTimer::new(1, Duration::from_millis(10));
        timer.next_attempt();
        assert!(timer.is_active());
        timer.reset();
        assert_eq!(timer.attempts(), 0);
        assert!(!timer.is_active());
        assert_eq!(timer.next_attempt(), Some(1));
    }

    #[test]
    fn test_zero_budget_never_schedules() {
        let mut timer = ReconnectTimer::new(0, Duration::from_millis(10));
        assert!(timer.is_exhausted());
        assert_eq!(timer.next_attempt(), None);
    }
}
