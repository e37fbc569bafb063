//! Per-window suppression reports and sweep summaries.
//!
//! These are the observable results of one sweep: which loggers dropped
//! messages in the last window, which limits were cut, and how much traffic
//! the whole process produced.

use crate::domain::identity::LoggerIdentity;

/// Template of the notice sent for a logger that dropped messages.
pub const SUPPRESSED_NOTICE: &str =
    "suppressed messages in last window: critical={}, non-critical={}";

/// Template of the notice sent before noisy loggers are cut back.
pub const REDUCTION_NOTICE: &str = "message overflow exceeded, reducing limits for noisy loggers";

/// Template of the notice sent for each individual limit reduction.
pub const LIMIT_REDUCED_NOTICE: &str = "reducing non-critical message limit by {} for logger {}";

/// How many messages one logger dropped in the last window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionReport {
    /// Logger that dropped messages
    pub identity: LoggerIdentity,
    /// Error-level messages dropped
    pub critical: u64,
    /// Below-error messages dropped
    pub non_critical: u64,
}

impl SuppressionReport {
    /// Build a report from window counts and limits.
    ///
    /// Returns `None` when neither class went over its limit.
    pub fn from_window(
        identity: &LoggerIdentity,
        non_critical_count: u64,
        non_critical_limit: u64,
        critical_count: u64,
        critical_limit: u64,
    ) -> Option<Self> {
        let non_critical = non_critical_count.saturating_sub(non_critical_limit);
        let critical = critical_count.saturating_sub(critical_limit);
        if non_critical == 0 && critical == 0 {
            return None;
        }
        Some(Self {
            identity: identity.clone(),
            critical,
            non_critical,
        })
    }

    /// Total dropped across both classes.
    pub fn total(&self) -> u64 {
        self.critical.saturating_add(self.non_critical)
    }
}

/// One non-critical limit cut made by the adjustment policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitReduction {
    pub identity: LoggerIdentity,
    /// Limit before the cut
    pub previous_limit: u64,
    /// Amount removed (may be zero once the limit is small)
    pub reduced_by: u64,
}

impl LimitReduction {
    pub fn new_limit(&self) -> u64 {
        self.previous_limit - self.reduced_by
    }
}

/// Result of one sweep and adjustment pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SweepSummary {
    /// Sum of both counters over every logger in the window
    pub global_total: u64,
    /// Global limit the total was compared against
    pub global_limit: u64,
    /// Loggers with non-critical traffic, noisiest first
    pub ranked: Vec<(LoggerIdentity, u64)>,
    /// Loggers that dropped messages
    pub suppressed: Vec<SuppressionReport>,
    /// Limits cut by the adjustment policy
    pub reductions: Vec<LimitReduction>,
    /// Consecutive overflowing windows after this pass
    pub streak: u32,
}

impl SweepSummary {
    /// Whether this pass cut any limit.
    pub fn adjusted(&self) -> bool {
        !self.reductions.is_empty()
    }

    /// Total messages dropped across all loggers.
    pub fn total_suppressed(&self) -> u64 {
        self.suppressed.iter().map(SuppressionReport::total).sum()
    }
}
