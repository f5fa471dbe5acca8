// ── Reconnect policy ──
//
// All delays are counted in `time_unit`s so tests can shrink a whole
// policy by changing one field.

use std::time::Duration;

/// How the wait grows between refused or truncated attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// 1, 2, 4, 6, 8, ... units.
    Linear,
    /// 1, 2, 4, 8, ... units.
    Doubling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Refused or truncated attempts before giving up. Resets don't count.
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub time_unit: Duration,
    /// Fixed wait after the gateway resets the connection.
    pub reset_delay_units: u32,
    /// Limit on each handshake read.
    pub handshake_timeout_units: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff::Linear,
            time_unit: Duration::from_secs(1),
            reset_delay_units: 60,
            handshake_timeout_units: 5,
        }
    }
}

impl RetryPolicy {
    /// Policy of a one-shot connection test.
    pub fn test_connection() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Doubling,
            ..Self::default()
        }
    }

    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Wait after the `failures`-th consecutive failure, or `None` once the
    /// budget is spent.
    pub fn delay_after(&self, failures: u32) -> Option<Duration> {
        if failures == 0 || failures >= self.max_attempts {
            return None;
        }
        let units = match self.backoff {
            Backoff::Linear if failures == 1 => 1,
            Backoff::Linear => (failures - 1).saturating_mul(2),
            Backoff::Doubling => 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX),
        };
        Some(self.time_unit.saturating_mul(units))
    }

    pub fn reset_delay(&self) -> Duration {
        self.time_unit.saturating_mul(self.reset_delay_units)
    }

    pub fn handshake_timeout(&self) -> Duration {
        self.time_unit.saturating_mul(self.handshake_timeout_units)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn schedule(policy: &RetryPolicy) -> Vec<u64> {
        (1..=policy.max_attempts)
            .map_while(|n| policy.delay_after(n))
            .map(|d| d.as_secs())
            .collect()
    }

    #[test]
    fn linear_schedule_is_strictly_increasing() {
        let policy = RetryPolicy {
            max_attempts: 6,
            ..RetryPolicy::default()
        };
        assert_eq!(schedule(&policy), [1, 2, 4, 6, 8]);
    }

    #[test]
    fn default_budget_has_no_wait_after_the_last_failure() {
        let policy = RetryPolicy::default();
        assert_eq!(schedule(&policy), [1, 2, 4, 6]);
        assert_eq!(policy.delay_after(5), None);
    }

    #[test]
    fn test_connection_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            ..RetryPolicy::test_connection()
        };
        assert_eq!(schedule(&policy), [1, 2, 4]);
        assert_eq!(schedule(&RetryPolicy::test_connection()), [1, 2]);
    }

    #[test]
    fn units_scale() {
        let policy = RetryPolicy::default().with_time_unit(Duration::from_millis(10));
        assert_eq!(policy.reset_delay(), Duration::from_millis(600));
        assert_eq!(policy.handshake_timeout(), Duration::from_millis(50));
        assert_eq!(policy.delay_after(3), Some(Duration::from_millis(40)));
    }
}
