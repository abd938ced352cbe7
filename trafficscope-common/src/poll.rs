//! Poll bookkeeping for the snapshot fetcher.
//!
//! The gate allows a single fetch in flight. A poll tick that fires while a
//! fetch is still pending is skipped, never queued.

/// In-flight guard and failure accounting for snapshot polling.
#[derive(Debug, Clone, Default)]
pub struct PollGate {
    in_flight: bool,
    /// Ticks skipped because a fetch was still pending.
    skipped: u64,
    /// Failures since the last successful fetch.
    consecutive_failures: u32,
    /// Message of the most recent failure, cleared on success.
    last_error: Option<String>,
    /// Epoch millis of the last successful fetch.
    last_success: Option<i64>,
}

impl PollGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start a fetch. Returns `false` (and counts a skip) when one is
    /// already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            self.skipped += 1;
            tracing::debug!(skipped = self.skipped, "Fetch still in flight, skipping poll");
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record that the in-flight fetch succeeded at `now` (epoch millis).
    pub fn succeed(&mut self, now: i64) {
        self.in_flight = false;
        if self.consecutive_failures > 0 {
            tracing::info!(
                failures = self.consecutive_failures,
                "Snapshot fetch recovered"
            );
        }
        self.consecutive_failures = 0;
        self.last_error = None;
        self.last_success = Some(now);
    }

    /// Record that the in-flight fetch failed.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.in_flight = false;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error.into());
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_success(&self) -> Option<i64> {
        self.last_success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_while_in_flight() {
        let mut gate = PollGate::new();

        assert!(gate.try_begin());
        assert!(gate.in_flight());
        assert!(!gate.try_begin());
        assert!(!gate.try_begin());
        assert_eq!(gate.skipped(), 2);

        gate.succeed(100);
        assert!(!gate.in_flight());
        assert!(gate.try_begin());
    }

    #[test]
    fn test_failure_streak_and_recovery() {
        let mut gate = PollGate::new();

        for _ in 0..3 {
            assert!(gate.try_begin());
            gate.fail("HTTP 500");
        }
        assert_eq!(gate.consecutive_failures(), 3);
        assert_eq!(gate.last_error(), Some("HTTP 500"));
        assert!(gate.last_success().is_none());

        assert!(gate.try_begin());
        gate.succeed(5000);
        assert_eq!(gate.consecutive_failures(), 0);
        assert!(gate.last_error().is_none());
        assert_eq!(gate.last_success(), Some(5000));
    }
}
