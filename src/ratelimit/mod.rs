use std::time::Duration;

/// Unbounded exponential wait for explicit rate-limit responses.
///
/// There is no ceiling: dropping a game's data is worse than a slow run.
#[derive(Debug, Clone)]
pub struct RateLimitBackoff {
    base: Duration,
    consecutive: u32,
}

impl RateLimitBackoff {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            consecutive: 0,
        }
    }

    /// Wait to apply after the next rate-limit response: `base * 2^n`.
    pub fn next_wait(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.consecutive).unwrap_or(u32::MAX);
        self.consecutive = self.consecutive.saturating_add(1);
        self.base.saturating_mul(factor)
    }
}

/// Fixed number of attempts; exhaustion is an acceptable outcome.
#[derive(Debug, Clone)]
pub struct AttemptBudget {
    total: u32,
    used: u32,
}

impl AttemptBudget {
    pub fn new(total: u32) -> Self {
        Self { total, used: 0 }
    }

    /// Claims the next attempt, returning its zero-based index.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.used >= self.total {
            return None;
        }
        self.used += 1;
        Some(self.used - 1)
    }

    pub fn remaining(&self) -> u32 {
        self.total - self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_base() {
        let mut backoff = RateLimitBackoff::new(Duration::from_secs(120));

        assert_eq!(backoff.next_wait(), Duration::from_secs(120));
        assert_eq!(backoff.next_wait(), Duration::from_secs(240));
        assert_eq!(backoff.next_wait(), Duration::from_secs(480));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let mut backoff = RateLimitBackoff::new(Duration::from_secs(1));
        for _ in 0..40 {
            backoff.next_wait();
        }

        assert_eq!(backoff.next_wait(), Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn budget_hands_out_exactly_total_attempts() {
        let mut budget = AttemptBudget::new(3);

        assert_eq!(budget.next_attempt(), Some(0));
        assert_eq!(budget.remaining(), 2);
        assert_eq!(budget.next_attempt(), Some(1));
        assert_eq!(budget.next_attempt(), Some(2));
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.next_attempt(), None);
    }
}
