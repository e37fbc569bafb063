//! Observability metrics for the governor.
//!
//! Provides counters about gating and adjustment behavior for monitoring and
//! debugging. Unlike the per-logger window counters, these are never reset
//! by a sweep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking governor statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Total number of records forwarded to the backend
    events_forwarded: AtomicU64,
    /// Total number of records dropped for being over a limit
    events_suppressed: AtomicU64,
    /// Total number of completed sweeps
    sweeps_completed: AtomicU64,
    /// Total number of non-zero limit reductions
    limits_reduced: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                events_forwarded: AtomicU64::new(0),
                events_suppressed: AtomicU64::new(0),
                sweeps_completed: AtomicU64::new(0),
                limits_reduced: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_forwarded(&self) {
        self.inner.events_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.events_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self) {
        self.inner.sweeps_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reductions(&self, count: u64) {
        self.inner.limits_reduced.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the total number of records forwarded.
    pub fn events_forwarded(&self) -> u64 {
        self.inner.events_forwarded.load(Ordering::Relaxed)
    }

    /// Get the total number of records suppressed.
    pub fn events_suppressed(&self) -> u64 {
        self.inner.events_suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of completed sweeps.
    pub fn sweeps_completed(&self) -> u64 {
        self.inner.sweeps_completed.load(Ordering::Relaxed)
    }

    /// Get the number of limit reductions applied.
    pub fn limits_reduced(&self) -> u64 {
        self.inner.limits_reduced.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_forwarded: self.events_forwarded(),
            events_suppressed: self.events_suppressed(),
            sweeps_completed: self.sweeps_completed(),
            limits_reduced: self.limits_reduced(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_forwarded: u64,
    pub events_suppressed: u64,
    pub sweeps_completed: u64,
    pub limits_reduced: u64,
}

impl MetricsSnapshot {
    /// Calculate the suppression rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no events have been gated.
    pub fn suppression_rate(&self) -> f64 {
        let total = self.total_events();
        if total == 0 {
            0.0
        } else {
            self.events_suppressed as f64 / total as f64
        }
    }

    /// Get the total number of gated events (forwarded + suppressed).
    pub fn total_events(&self) -> u64 {
        self.events_forwarded.saturating_add(self.events_suppressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot {
            events_forwarded: 0,
            events_suppressed: 0,
            sweeps_completed: 0,
            limits_reduced: 0,
        });
    }

    #[test]
    fn test_record_and_snapshot() {
        let metrics = Metrics::new();
        metrics.record_forwarded();
        metrics.record_forwarded();
        metrics.record_suppressed();
        metrics.record_sweep();
        metrics.record_reductions(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_forwarded, 2);
        assert_eq!(snapshot.events_suppressed, 1);
        assert_eq!(snapshot.sweeps_completed, 1);
        assert_eq!(snapshot.limits_reduced, 1);
        assert_eq!(snapshot.total_events(), 3);
    }

    #[test]
    fn test_snapshot_suppression_rate() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().suppression_rate(), 0.0);

        metrics.record_forwarded();
        metrics.record_suppressed();
        metrics.record_suppressed();
        metrics.record_suppressed();
        assert!((metrics.snapshot().suppression_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_clone_shares_counters() {
        let metrics1 = Metrics::new();
        metrics1.record_forwarded();

        let metrics2 = metrics1.clone();
        metrics2.record_forwarded();

        assert_eq!(metrics1.events_forwarded(), 2);
        assert_eq!(metrics2.events_forwarded(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_forwarded();
                    m.record_suppressed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.events_forwarded(), 1000);
        assert_eq!(metrics.events_suppressed(), 1000);
    }
}
