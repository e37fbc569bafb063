//! Per-logger gating.
//!
//! A `GatedLogger` sits in front of the backend for one identity. Every call
//! is counted against its class (critical for error level, non-critical for
//! everything else); it is forwarded only while the count is within the
//! class limit and the backend has the level enabled.

use crate::application::metrics::Metrics;
use crate::application::ports::LogBackend;
use crate::domain::identity::{LoggerIdentity, Marker};
use crate::domain::limits::LoggerLimits;
use crate::domain::record::{Level, LogRecord, MessageClass};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Decision about whether a call is within its class limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// The call fits in the current window
    Allow,
    /// The class limit is exhausted for this window
    Suppress,
}

impl LimitDecision {
    pub fn is_allow(self) -> bool {
        matches!(self, LimitDecision::Allow)
    }
}

/// What `GatedLogger::emit` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Handed to the backend
    Forwarded,
    /// Dropped for being over the class limit
    Suppressed,
    /// Within limit, but the backend has the level disabled
    Disabled,
}

/// Counts of one window, taken by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowCounts {
    pub(crate) non_critical: u64,
    pub(crate) critical: u64,
}

impl WindowCounts {
    pub(crate) fn total(&self) -> u64 {
        self.non_critical.saturating_add(self.critical)
    }
}

/// Rate-limited view of the backend for a single identity.
///
/// Counters are atomic so concurrent callers never lose an increment. The
/// non-critical limit is read with relaxed ordering: a caller racing with an
/// adjustment may see the old or the new value, never a torn one. The
/// critical limit is fixed at creation.
pub struct GatedLogger {
    identity: LoggerIdentity,
    backend: Arc<dyn LogBackend>,
    metrics: Metrics,
    critical_limit: u64,
    non_critical_limit: AtomicU64,
    critical_count: AtomicU64,
    non_critical_count: AtomicU64,
}

impl GatedLogger {
    pub(crate) fn new(
        identity: LoggerIdentity,
        limits: LoggerLimits,
        backend: Arc<dyn LogBackend>,
        metrics: Metrics,
    ) -> Self {
        Self {
            identity,
            backend,
            metrics,
            critical_limit: limits.critical(),
            non_critical_limit: AtomicU64::new(limits.non_critical()),
            critical_count: AtomicU64::new(0),
            non_critical_count: AtomicU64::new(0),
        }
    }

    pub fn identity(&self) -> &LoggerIdentity {
        &self.identity
    }

    /// Count one call at `level` and decide whether it fits its class limit.
    ///
    /// The counter is incremented whether or not the call is allowed, so the
    /// count reflects how noisy the source was, not how much got through.
    pub fn admit(&self, level: Level) -> LimitDecision {
        let class = level.class();
        let count = self.counter(class).fetch_add(1, Ordering::Relaxed) + 1;
        if count <= self.limit(class) {
            LimitDecision::Allow
        } else {
            LimitDecision::Suppress
        }
    }

    /// Gate one log call.
    ///
    /// # Performance
    /// Two atomic operations on the hot path, no allocation, no lock.
    pub fn emit(&self, record: &LogRecord<'_>) -> Emission {
        if !self.admit(record.level()).is_allow() {
            self.metrics.record_suppressed();
            return Emission::Suppressed;
        }
        if !self
            .backend
            .is_enabled(&self.identity, record.level(), record.marker())
        {
            return Emission::Disabled;
        }
        self.backend.forward(&self.identity, record);
        self.metrics.record_forwarded();
        Emission::Forwarded
    }

    /// Whether the backend has `level` enabled for this identity.
    ///
    /// Does not count anything and ignores the limits.
    pub fn is_enabled(&self, level: Level, marker: Option<&Marker>) -> bool {
        self.backend.is_enabled(&self.identity, level, marker)
    }

    pub fn trace(&self, message: &str) -> Emission {
        self.emit(&LogRecord::trace(message))
    }

    pub fn debug(&self, message: &str) -> Emission {
        self.emit(&LogRecord::debug(message))
    }

    pub fn info(&self, message: &str) -> Emission {
        self.emit(&LogRecord::info(message))
    }

    pub fn warn(&self, message: &str) -> Emission {
        self.emit(&LogRecord::warn(message))
    }

    pub fn error(&self, message: &str) -> Emission {
        self.emit(&LogRecord::error(message))
    }

    /// Calls at error level in the current window.
    pub fn critical_count(&self) -> u64 {
        self.critical_count.load(Ordering::Relaxed)
    }

    /// Calls below error level in the current window.
    pub fn non_critical_count(&self) -> u64 {
        self.non_critical_count.load(Ordering::Relaxed)
    }

    pub fn critical_limit(&self) -> u64 {
        self.critical_limit
    }

    pub fn non_critical_limit(&self) -> u64 {
        self.non_critical_limit.load(Ordering::Relaxed)
    }

    pub(crate) fn set_non_critical_limit(&self, limit: u64) {
        self.non_critical_limit.store(limit, Ordering::Relaxed);
    }

    /// Read and zero both counters.
    ///
    /// Each counter is swapped atomically, so a concurrent increment lands
    /// either in the returned window or in the next one.
    pub(crate) fn take_window(&self) -> WindowCounts {
        WindowCounts {
            non_critical: self.non_critical_count.swap(0, Ordering::Relaxed),
            critical: self.critical_count.swap(0, Ordering::Relaxed),
        }
    }

    fn counter(&self, class: MessageClass) -> &AtomicU64 {
        match class {
            MessageClass::Critical => &self.critical_count,
            MessageClass::NonCritical => &self.non_critical_count,
        }
    }

    fn limit(&self, class: MessageClass) -> u64 {
        match class {
            MessageClass::Critical => self.critical_limit,
            MessageClass::NonCritical => self.non_critical_limit(),
        }
    }
}

impl fmt::Debug for GatedLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedLogger")
            .field("identity", &self.identity)
            .field("non_critical_count", &self.non_critical_count())
            .field("non_critical_limit", &self.non_critical_limit())
            .field("critical_count", &self.critical_count())
            .field("critical_limit", &self.critical_limit)
            .finish()
    }
}
