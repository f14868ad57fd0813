//! Open-ended scan termination
//!
//! The controller watches task outcomes in ascending key order and decides
//! when an open dimension is finished. `Absent` and `PermanentFailure` are
//! tracked in separate streak counters: only an `Absent` streak terminates
//! the scan, since an unreachable resource says nothing about whether it
//! exists. A failure streak of the same length is surfaced as a warning so
//! the caller can re-run the range once the network recovers.

use tracing::warn;

use crate::engine::TaskOutcome;

/// Why a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Consecutive-miss threshold reached on an open dimension
    MissLimit,
    /// Hard ceiling forced termination
    SafetyCeiling,
    /// Every key in a closed dimension was dispatched
    Exhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::MissLimit => write!(f, "miss limit"),
            StopReason::SafetyCeiling => write!(f, "safety ceiling"),
            StopReason::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Per-dimension scan state for open-ended walks
#[derive(Debug)]
pub struct ScanController {
    miss_threshold: u32,
    miss_streak: u32,
    failure_streak: u32,
    stopped: Option<StopReason>,
}

impl ScanController {
    pub fn new(miss_threshold: u32) -> Self {
        Self {
            miss_threshold,
            miss_streak: 0,
            failure_streak: 0,
            stopped: None,
        }
    }

    /// Whether the dimension is still being walked
    pub fn is_scanning(&self) -> bool {
        self.stopped.is_none()
    }

    /// The stop reason, once stopped
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    /// Record that the key iterator ran out (the safety ceiling)
    pub fn hit_ceiling(&mut self) {
        if self.stopped.is_none() {
            self.stopped = Some(StopReason::SafetyCeiling);
        }
    }

    /// Feed one outcome, in key order; returns the stop reason if this
    /// outcome ended the scan
    pub fn observe(&mut self, outcome: &TaskOutcome) -> Option<StopReason> {
        match outcome {
            TaskOutcome::Ingested | TaskOutcome::AlreadyStored => {
                self.miss_streak = 0;
                self.failure_streak = 0;
            },
            TaskOutcome::Missing => {
                // A 404 is a real answer from the site, so it also proves
                // reachability.
                self.miss_streak += 1;
                self.failure_streak = 0;
                if self.miss_streak >= self.miss_threshold {
                    self.stopped = Some(StopReason::MissLimit);
                }
            },
            TaskOutcome::Failed(_) => {
                // Unreachable is not absent: failures never advance the
                // miss counter toward termination.
                self.failure_streak += 1;
                if self.failure_streak == self.miss_threshold {
                    warn!(
                        streak = self.failure_streak,
                        "consecutive fetch failures; scan continues, consider re-running this range"
                    );
                }
            },
        }
        self.stopped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_streak_terminates_at_threshold() {
        let mut controller = ScanController::new(2);

        assert_eq!(controller.observe(&TaskOutcome::Missing), None);
        assert!(controller.is_scanning());
        assert_eq!(
            controller.observe(&TaskOutcome::Missing),
            Some(StopReason::MissLimit)
        );
        assert!(!controller.is_scanning());
    }

    #[test]
    fn test_found_resets_miss_streak() {
        let mut controller = ScanController::new(2);

        controller.observe(&TaskOutcome::Missing);
        controller.observe(&TaskOutcome::Ingested);
        controller.observe(&TaskOutcome::Missing);
        assert!(controller.is_scanning());
        controller.observe(&TaskOutcome::Missing);
        assert_eq!(controller.stop_reason(), Some(StopReason::MissLimit));
    }

    #[test]
    fn test_already_stored_counts_as_found() {
        let mut controller = ScanController::new(2);

        controller.observe(&TaskOutcome::Missing);
        controller.observe(&TaskOutcome::AlreadyStored);
        controller.observe(&TaskOutcome::Missing);
        assert!(controller.is_scanning());
    }

    #[test]
    fn test_failures_do_not_advance_miss_counter() {
        let mut controller = ScanController::new(2);

        controller.observe(&TaskOutcome::Missing);
        for _ in 0..5 {
            controller.observe(&TaskOutcome::Failed("timeout".to_string()));
        }
        // Still scanning: unreachable was never conflated with absent.
        assert!(controller.is_scanning());

        // Failures leave the miss counter alone, so the pre-outage miss
        // still stands and one more Absent completes the streak.
        controller.observe(&TaskOutcome::Missing);
        assert_eq!(controller.stop_reason(), Some(StopReason::MissLimit));
    }

    #[test]
    fn test_ceiling_stop() {
        let mut controller = ScanController::new(2);
        controller.hit_ceiling();
        assert_eq!(controller.stop_reason(), Some(StopReason::SafetyCeiling));
    }
}
