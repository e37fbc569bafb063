//! # log-governor
//!
//! Adaptive, per-source log throttling with a global feedback loop.
//!
//! Every log source (a *logger identity*) gets its own budget per window:
//! a limit for error-level (*critical*) messages and a separate, adjustable
//! limit for everything below error (*non-critical*). Calls are counted as
//! they happen and forwarded to the logging backend only while the count is
//! within the limit.
//!
//! Periodically (or on demand) a *sweep* closes the window: it reads and
//! zeroes every logger's counters, reports how many messages each logger
//! dropped, and compares the total traffic of the whole process against a
//! global limit. When the process stays well over that limit for several
//! consecutive windows, the non-critical limits of the noisiest loggers are
//! cut by a small percentage. Limits are never raised again automatically.
//!
//! ## Quick Start
//!
//! ```rust
//! use log_governor::LogGovernor;
//!
//! let governor = LogGovernor::builder()
//!     .with_default_limits(100, 20)
//!     .with_global_limit(5_000)
//!     .build()
//!     .unwrap();
//!
//! let logger = governor.logger("payments::ledger");
//! logger.info("ledger opened");
//!
//! // Close the window by hand; with the `async` feature a scheduler can do
//! // this every few minutes instead.
//! let summary = governor.trigger_sweep_now();
//! assert_eq!(summary.global_total, 1);
//! assert_eq!(logger.non_critical_count(), 0);
//! ```
//!
//! ## Structured records
//!
//! Calls carry a level, an optional marker, a message template with `{}`
//! placeholders, arguments and an optional attached error. The gate never
//! formats anything: the backend receives the record exactly as written.
//!
//! ```rust
//! use log_governor::{Level, LogGovernor, LogRecord, Marker};
//! use std::fmt::Display;
//!
//! let governor = LogGovernor::new();
//! let logger = governor.logger("auth");
//! let audit = Marker::new("AUDIT");
//! let user = "alice";
//! let args: [&dyn Display; 1] = [&user];
//!
//! logger.emit(
//!     &LogRecord::new(Level::Warn, "login failed for {}")
//!         .with_marker(&audit)
//!         .with_args(&args),
//! );
//! ```
//!
//! ## Filtering `tracing` events
//!
//! The same budgets can be applied to plain `tracing` events. The event's
//! target is used as the logger identity, and error events count against the
//! critical limit.
//!
//! ```rust,no_run
//! use log_governor::LogGovernor;
//! use tracing_subscriber::prelude::*;
//!
//! let governor = LogGovernor::new();
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer().with_filter(governor.filter()))
//!     .init();
//! ```
//!
//! Events under the `log_governor` target (the governor's own diagnostics and
//! the records it forwards through [`TracingBackend`]) are never counted.
//!
//! ## Periodic sweeps
//!
//! With the `async` feature (enabled by default), sweeps can run on a tokio
//! task at a fixed interval (5 minutes by default):
//!
//! ```rust,no_run
//! # use log_governor::LogGovernor;
//! # use std::time::Duration;
//! # async fn example() {
//! let governor = LogGovernor::builder()
//!     .with_sweep_interval(Duration::from_secs(60))
//!     .with_periodic_sweeps(true)
//!     .build()
//!     .unwrap();
//!
//! // On-demand sweeps still work and do not shift the schedule.
//! governor.trigger_sweep_now();
//!
//! governor.shutdown().await.expect("shutdown failed");
//! # }
//! ```
//!
//! ## Observability
//!
//! ```rust
//! # use log_governor::LogGovernor;
//! # let governor = LogGovernor::new();
//! let snapshot = governor.metrics().snapshot();
//! println!("Forwarded: {}", snapshot.events_forwarded);
//! println!("Suppressed: {}", snapshot.events_suppressed);
//! println!("Limits cut: {}", snapshot.limits_reduced);
//! println!("Suppression rate: {:.2}%", snapshot.suppression_rate() * 100.0);
//! ```
//!
//! ## Registry semantics
//!
//! The first call for an identity decides its limits. Later calls for the
//! same identity return the existing logger and ignore the limits they pass,
//! although zero limits are still rejected. Loggers are never removed.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    identity::{LoggerIdentity, Marker, GOVERNOR_TARGET},
    limits::{
        LimitError, LoggerLimits, DEFAULT_CRITICAL_LIMIT, DEFAULT_GLOBAL_LIMIT,
        DEFAULT_NON_CRITICAL_LIMIT,
    },
    overflow::{AdjustmentConfig, AdjustmentConfigError, OverflowTracker},
    record::{Level, LogRecord, MessageClass},
    summary::{LimitReduction, SuppressionReport, SweepSummary},
};

pub use application::{
    adjustment::AdjustmentPolicy,
    gate::{Emission, GatedLogger, LimitDecision},
    metrics::{Metrics, MetricsSnapshot},
    ports::{LogBackend, Storage},
    registry::{GlobalBudget, LoggerRegistry},
    scheduler::{SchedulerConfig, SchedulerConfigError, SweepScheduler, DEFAULT_SWEEP_INTERVAL},
    sweep::{RankingEntry, SweepController},
};

#[cfg(feature = "async")]
pub use application::scheduler::{SchedulerHandle, ShutdownError};

pub use infrastructure::{
    backend::TracingBackend,
    governor::{BuildError, DefaultStorage, LogGovernor, LogGovernorBuilder},
    layer::GovernorFilter,
    storage::ShardedStorage,
};
