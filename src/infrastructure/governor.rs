//! The assembled governor.
//!
//! `LogGovernor` wires a registry, a sweep controller and (optionally) a
//! periodic scheduler together behind one handle, and is the usual entry
//! point for applications.

use crate::application::gate::GatedLogger;
use crate::application::metrics::Metrics;
use crate::application::ports::LogBackend;
use crate::application::registry::LoggerRegistry;
use crate::application::scheduler::{
    SchedulerConfig, SchedulerConfigError, DEFAULT_SWEEP_INTERVAL,
};
use crate::application::sweep::SweepController;
use crate::domain::identity::LoggerIdentity;
use crate::domain::limits::{
    LimitError, LoggerLimits, DEFAULT_CRITICAL_LIMIT, DEFAULT_GLOBAL_LIMIT,
    DEFAULT_NON_CRITICAL_LIMIT,
};
use crate::domain::overflow::{AdjustmentConfig, AdjustmentConfigError};
use crate::domain::summary::SweepSummary;
use crate::infrastructure::backend::TracingBackend;
use crate::infrastructure::layer::GovernorFilter;
use crate::infrastructure::storage::ShardedStorage;

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "async")]
use crate::application::scheduler::{SchedulerHandle, ShutdownError, SweepScheduler};

#[cfg(feature = "async")]
use std::sync::{Mutex, PoisonError};

/// Storage used by the assembled governor.
pub type DefaultStorage = ShardedStorage<LoggerIdentity, Arc<GatedLogger>>;

/// Error returned when building a `LogGovernor` fails.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// A per-logger or global limit was zero
    Limit(LimitError),
    /// Adjustment configuration validation failed
    Adjustment(AdjustmentConfigError),
    /// Scheduler configuration validation failed
    Scheduler(SchedulerConfigError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Limit(e) => write!(f, "limit configuration error: {}", e),
            BuildError::Adjustment(e) => write!(f, "adjustment configuration error: {}", e),
            BuildError::Scheduler(e) => write!(f, "scheduler configuration error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Limit(e) => Some(e),
            BuildError::Adjustment(e) => Some(e),
            BuildError::Scheduler(e) => Some(e),
        }
    }
}

impl From<LimitError> for BuildError {
    fn from(e: LimitError) -> Self {
        BuildError::Limit(e)
    }
}

impl From<AdjustmentConfigError> for BuildError {
    fn from(e: AdjustmentConfigError) -> Self {
        BuildError::Adjustment(e)
    }
}

impl From<SchedulerConfigError> for BuildError {
    fn from(e: SchedulerConfigError) -> Self {
        BuildError::Scheduler(e)
    }
}

/// Builder for configuring a `LogGovernor`.
#[derive(Debug)]
pub struct LogGovernorBuilder {
    non_critical_limit: u64,
    critical_limit: u64,
    global_limit: u64,
    sweep_interval: Duration,
    adjustment: AdjustmentConfig,
    backend: Option<Arc<dyn LogBackend>>,
    #[cfg_attr(not(feature = "async"), allow(dead_code))]
    periodic_sweeps: bool,
}

impl LogGovernorBuilder {
    /// Set the limits for loggers created without explicit ones.
    ///
    /// The values will be validated when `build()` is called.
    pub fn with_default_limits(mut self, non_critical: u64, critical: u64) -> Self {
        self.non_critical_limit = non_critical;
        self.critical_limit = critical;
        self
    }

    /// Set the initial process-wide message budget per window.
    pub fn with_global_limit(mut self, limit: u64) -> Self {
        self.global_limit = limit;
        self
    }

    /// Set the time between periodic sweeps.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the overflow threshold, streak length, offender cap and
    /// reduction percentage.
    pub fn with_adjustment_config(mut self, config: AdjustmentConfig) -> Self {
        self.adjustment = config;
        self
    }

    /// Forward to a custom backend instead of `tracing`.
    pub fn with_backend(mut self, backend: Arc<dyn LogBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Start periodic sweeps as part of `build()`.
    ///
    /// **Requires the `async` feature** and a running tokio runtime; without
    /// the feature this setting has no effect.
    ///
    /// Default: disabled
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use log_governor::LogGovernor;
    /// # use std::time::Duration;
    /// # async fn example() {
    /// let governor = LogGovernor::builder()
    ///     .with_periodic_sweeps(true)
    ///     .with_sweep_interval(Duration::from_secs(60))
    ///     .build()
    ///     .unwrap();
    /// # }
    /// ```
    pub fn with_periodic_sweeps(mut self, enabled: bool) -> Self {
        self.periodic_sweeps = enabled;
        self
    }

    /// Build the governor.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    ///
    /// # Panics
    /// With periodic sweeps enabled, panics if called outside a tokio runtime.
    pub fn build(self) -> Result<LogGovernor, BuildError> {
        let limits = LoggerLimits::new(self.non_critical_limit, self.critical_limit)?;
        let scheduler_config = SchedulerConfig::new(self.sweep_interval)?;

        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(TracingBackend::new()));
        let registry = Arc::new(LoggerRegistry::new(
            ShardedStorage::new(),
            backend,
            limits,
            self.global_limit,
        )?);
        let controller = Arc::new(SweepController::new(
            Arc::clone(&registry),
            self.adjustment,
        )?);

        let governor = LogGovernor {
            registry,
            controller,
            scheduler_config,
            #[cfg(feature = "async")]
            scheduler: Arc::new(Mutex::new(None)),
        };

        #[cfg(feature = "async")]
        {
            if self.periodic_sweeps {
                governor.start_scheduler();
            }
        }

        Ok(governor)
    }
}

/// Registry, sweep controller and scheduler behind one handle.
///
/// Clones share all state.
#[derive(Clone)]
pub struct LogGovernor {
    registry: Arc<LoggerRegistry<DefaultStorage>>,
    controller: Arc<SweepController<DefaultStorage>>,
    scheduler_config: SchedulerConfig,
    #[cfg(feature = "async")]
    scheduler: Arc<Mutex<Option<SchedulerHandle>>>,
}

impl LogGovernor {
    /// Create a builder for configuring the governor.
    ///
    /// Defaults:
    /// - Per-logger limits: 100 non-critical, 100 critical
    /// - Global limit: 10,000 per window
    /// - Sweep interval: 5 minutes
    /// - Adjustment: 20% overflow threshold, 5 sweeps, 5 offenders, 5% cuts
    /// - Backend: `TracingBackend`
    /// - Periodic sweeps: disabled
    pub fn builder() -> LogGovernorBuilder {
        LogGovernorBuilder {
            non_critical_limit: DEFAULT_NON_CRITICAL_LIMIT,
            critical_limit: DEFAULT_CRITICAL_LIMIT,
            global_limit: DEFAULT_GLOBAL_LIMIT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            adjustment: AdjustmentConfig::default(),
            backend: None,
            periodic_sweeps: false,
        }
    }

    /// Create a governor with default settings.
    ///
    /// # Panics
    /// This method cannot panic because all default values are valid.
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("default configuration is always valid")
    }

    /// Get the gated logger for `identity`, created with default limits.
    pub fn logger(&self, identity: impl Into<LoggerIdentity>) -> Arc<GatedLogger> {
        self.registry.get_or_create(identity)
    }

    /// Get the gated logger for `identity`, created with the given limits.
    ///
    /// If the identity is already registered, the existing logger is
    /// returned with its original limits.
    ///
    /// # Errors
    /// Returns a `LimitError` if either limit is zero.
    pub fn logger_with_limits(
        &self,
        identity: impl Into<LoggerIdentity>,
        non_critical_limit: u64,
        critical_limit: u64,
    ) -> Result<Arc<GatedLogger>, LimitError> {
        self.registry
            .get_or_create_with_limits(identity, non_critical_limit, critical_limit)
    }

    /// Run one sweep now, on the calling thread.
    ///
    /// Does not shift the periodic schedule.
    pub fn trigger_sweep_now(&self) -> SweepSummary {
        self.controller.sweep()
    }

    /// Replace the process-wide budget per window.
    ///
    /// # Errors
    /// Returns `LimitError::ZeroGlobalLimit` if `limit` is zero; the previous
    /// value is kept.
    pub fn set_global_limit(&self, limit: u64) -> Result<(), LimitError> {
        self.registry.set_global_limit(limit)
    }

    pub fn global_limit(&self) -> u64 {
        self.registry.global_limit()
    }

    /// A `tracing_subscriber` filter that shares this governor's registry.
    pub fn filter(&self) -> GovernorFilter<DefaultStorage> {
        GovernorFilter::new(Arc::clone(&self.registry))
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry<DefaultStorage>> {
        &self.registry
    }

    pub fn controller(&self) -> &Arc<SweepController<DefaultStorage>> {
        &self.controller
    }

    /// Get observability metrics.
    pub fn metrics(&self) -> &Metrics {
        self.registry.metrics()
    }

    pub fn sweep_interval(&self) -> Duration {
        self.scheduler_config.interval()
    }

    /// Start periodic sweeps if they are not already running.
    ///
    /// Returns `false` if a scheduler was already running.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[cfg(feature = "async")]
    pub fn start_scheduler(&self) -> bool {
        let mut slot = self.scheduler.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(SchedulerHandle::is_running) {
            return false;
        }
        let scheduler = SweepScheduler::new(Arc::clone(&self.controller), self.scheduler_config);
        *slot = Some(scheduler.start());
        true
    }

    /// Whether periodic sweeps are running.
    #[cfg(feature = "async")]
    pub fn is_scheduler_running(&self) -> bool {
        self.scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(SchedulerHandle::is_running)
    }

    /// Stop periodic sweeps, if running.
    ///
    /// On-demand sweeps keep working afterwards.
    ///
    /// # Errors
    /// Returns an error if the sweep task fails to shut down gracefully.
    #[cfg(feature = "async")]
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        // Take the handle while holding the lock, then release the lock before awaiting
        let handle = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.shutdown().await?;
        }
        Ok(())
    }
}

impl Default for LogGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGovernor")
            .field("registry", &self.registry)
            .field("sweep_interval", &self.sweep_interval())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gate::Emission;
    use crate::infrastructure::mocks::RecordingBackend;

    fn governor(backend: &Arc<RecordingBackend>) -> LogGovernor {
        LogGovernor::builder()
            .with_backend(backend.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let governor = LogGovernor::new();
        assert_eq!(governor.global_limit(), 10_000);
        assert_eq!(governor.sweep_interval(), Duration::from_secs(300));
        assert_eq!(governor.registry().default_limits(), LoggerLimits::default());
    }

    #[test]
    fn test_builder_rejects_zero_limits() {
        let result = LogGovernor::builder().with_default_limits(0, 1).build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::Limit(LimitError::ZeroNonCriticalLimit)
        );

        let result = LogGovernor::builder().with_global_limit(0).build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::Limit(LimitError::ZeroGlobalLimit)
        );
    }

    #[test]
    fn test_builder_rejects_bad_adjustment_config() {
        let result = LogGovernor::builder()
            .with_adjustment_config(AdjustmentConfig {
                reduction_percent: 0,
                ..AdjustmentConfig::default()
            })
            .build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::Adjustment(AdjustmentConfigError::InvalidReductionPercent)
        );
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let result = LogGovernor::builder()
            .with_sweep_interval(Duration::ZERO)
            .build();
        assert_eq!(
            result.unwrap_err(),
            BuildError::Scheduler(SchedulerConfigError::ZeroInterval)
        );
    }

    #[test]
    fn test_build_error_display() {
        let err = BuildError::from(LimitError::ZeroCriticalLimit);
        assert_eq!(
            err.to_string(),
            "limit configuration error: critical limit must be greater than 0"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_logger_and_sweep_share_state() {
        let backend = Arc::new(RecordingBackend::new());
        let governor = governor(&backend);
        let logger = governor.logger_with_limits("svc", 1, 1).unwrap();

        assert_eq!(logger.info("a"), Emission::Forwarded);
        assert_eq!(logger.info("b"), Emission::Suppressed);

        let summary = governor.trigger_sweep_now();
        assert_eq!(summary.global_total, 2);
        assert_eq!(summary.total_suppressed(), 1);
        assert_eq!(governor.metrics().sweeps_completed(), 1);
        assert!(Arc::ptr_eq(&logger, &governor.logger("svc")));
    }

    #[test]
    fn test_set_global_limit() {
        let backend = Arc::new(RecordingBackend::new());
        let governor = governor(&backend);

        governor.set_global_limit(50).unwrap();
        assert_eq!(governor.global_limit(), 50);
        assert!(governor.set_global_limit(0).is_err());
        assert_eq!(governor.global_limit(), 50);
    }

    #[test]
    fn test_filter_shares_registry() {
        let backend = Arc::new(RecordingBackend::new());
        let governor = governor(&backend);
        let filter = governor.filter();

        filter.should_allow("app::db", crate::Level::Info);
        assert_eq!(governor.logger("app::db").non_critical_count(), 1);
    }
}
