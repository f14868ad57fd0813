//! Scan statistics
//!
//! Counters are atomics so concurrent workers can record outcomes without
//! coordination; one instance lives for one logical scan invocation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Thread-safe counters for one scan
#[derive(Debug)]
pub struct ScanStats {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    started_at: Instant,
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            attempted: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters and derived metrics
    pub fn summary(&self) -> StatsSummary {
        let attempted = self.attempted.load(Ordering::Relaxed);
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed();

        StatsSummary {
            attempted,
            succeeded,
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            elapsed,
            success_rate: succeeded as f64 / attempted.max(1) as f64 * 100.0,
            avg_secs_per_item: elapsed.as_secs_f64() / attempted.max(1) as f64,
        }
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived metrics for a completed (or in-flight) scan
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    #[serde(skip)]
    pub elapsed: Duration,
    pub success_rate: f64,
    pub avg_secs_per_item: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attempted={} succeeded={} failed={} skipped={} success_rate={:.1}% elapsed={:.1}s avg={:.2}s/item",
            self.attempted,
            self.succeeded,
            self.failed,
            self.skipped,
            self.success_rate,
            self.elapsed.as_secs_f64(),
            self.avg_secs_per_item,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = ScanStats::new();
        for _ in 0..5 {
            stats.record_attempt();
        }
        stats.record_success();
        stats.record_success();
        stats.record_success();
        stats.record_failure();
        stats.record_skip();

        let summary = stats.summary();
        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!((summary.success_rate - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary_does_not_divide_by_zero() {
        let summary = ScanStats::new().summary();
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.avg_secs_per_item < 0.1);
    }

    #[test]
    fn test_display_format() {
        let stats = ScanStats::new();
        stats.record_attempt();
        stats.record_success();
        let text = stats.summary().to_string();
        assert!(text.contains("attempted=1"));
        assert!(text.contains("success_rate=100.0%"));
    }
}
