//! Consecutive-failure counting and the lockdown window.

use std::time::Duration;
use tokio::time::Instant;

/// Result of recording a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The limit was reached. The count has been reset to 0.
    LockdownTriggered,

    /// Below the limit; `count` failures so far.
    Continued { count: u32 },
}

/// Counts consecutive unknown-code submissions.
///
/// Expiry of the lockdown window is not signalled: the main loop compares
/// [`lockdown_until`](Self::lockdown_until) against the clock every tick.
#[derive(Debug, Clone)]
pub struct FailureTracker {
    count: u32,
    limit: u32,
    lockdown_until: Option<Instant>,
}

impl FailureTracker {
    /// `limit` is clamped to at least 1.
    pub fn new(limit: u32) -> Self {
        Self {
            count: 0,
            limit: limit.max(1),
            lockdown_until: None,
        }
    }

    /// Count one failure.
    ///
    /// The failure that reaches the limit is consumed by the lockdown: the
    /// count restarts at 0, not at 1, once the lockdown is over.
    pub fn record_failure(&mut self) -> FailureOutcome {
        self.count += 1;
        if self.count >= self.limit {
            self.count = 0;
            FailureOutcome::LockdownTriggered
        } else {
            FailureOutcome::Continued { count: self.count }
        }
    }

    pub fn record_success(&mut self) {
        self.count = 0;
    }

    pub fn arm_lockdown(&mut self, now: Instant, duration: Duration) -> Instant {
        let until = now + duration;
        self.lockdown_until = Some(until);
        until
    }

    pub fn is_lockdown_active(&self, now: Instant) -> bool {
        self.lockdown_until.is_some_and(|until| now < until)
    }

    pub fn clear_lockdown(&mut self) {
        self.lockdown_until = None;
    }

    pub fn lockdown_until(&self) -> Option<Instant> {
        self.lockdown_until
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_triggers_and_resets() {
        let mut tracker = FailureTracker::new(5);
        for expected in 1..=4 {
            assert_eq!(
                tracker.record_failure(),
                FailureOutcome::Continued { count: expected }
            );
        }
        assert_eq!(tracker.count(), 4);

        assert_eq!(tracker.record_failure(), FailureOutcome::LockdownTriggered);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_success_resets() {
        let mut tracker = FailureTracker::new(5);
        tracker.record_failure();
        tracker.record_failure();
        tracker.record_success();
        assert_eq!(tracker.count(), 0);
        assert_eq!(
            tracker.record_failure(),
            FailureOutcome::Continued { count: 1 }
        );
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let mut tracker = FailureTracker::new(0);
        assert_eq!(tracker.limit(), 1);
        assert_eq!(tracker.record_failure(), FailureOutcome::LockdownTriggered);
    }

    #[test]
    fn test_lockdown_window() {
        let mut tracker = FailureTracker::new(5);
        let now = Instant::now();
        assert!(!tracker.is_lockdown_active(now));

        let until = tracker.arm_lockdown(now, Duration::from_secs(60));
        assert_eq!(tracker.lockdown_until(), Some(until));
        assert!(tracker.is_lockdown_active(now + Duration::from_secs(59)));
        assert!(!tracker.is_lockdown_active(until));

        tracker.clear_lockdown();
        assert_eq!(tracker.lockdown_until(), None);
    }
}
