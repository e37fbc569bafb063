//! Periodic sweeps.
//!
//! The scheduler runs the sweep controller at a fixed rate on a tokio task.
//! On-demand sweeps through the controller stay available while it runs and
//! do not shift the periodic cadence.

use crate::application::gate::GatedLogger;
use crate::application::ports::Storage;
use crate::application::sweep::SweepController;
use crate::domain::identity::LoggerIdentity;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "async")]
use tokio::{sync::watch, task::JoinHandle, time::interval_at};

/// Default time between two periodic sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Error returned when scheduler configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerConfigError {
    /// Sweep interval must be greater than zero
    ZeroInterval,
}

impl std::fmt::Display for SchedulerConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerConfigError::ZeroInterval => {
                write!(f, "sweep interval must be greater than 0")
            }
        }
    }
}

impl std::error::Error for SchedulerConfigError {}

/// Configuration for periodic sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl SchedulerConfig {
    /// # Errors
    /// Returns `SchedulerConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, SchedulerConfigError> {
        if interval.is_zero() {
            return Err(SchedulerConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Error returned when the scheduler task did not stop cleanly.
#[cfg(feature = "async")]
#[derive(Debug)]
pub enum ShutdownError {
    /// The task panicked during a sweep
    TaskPanicked,
    /// The task was cancelled before it could observe the shutdown signal
    TaskCancelled,
}

#[cfg(feature = "async")]
impl std::fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownError::TaskPanicked => write!(f, "sweep task panicked"),
            ShutdownError::TaskCancelled => write!(f, "sweep task was cancelled"),
        }
    }
}

#[cfg(feature = "async")]
impl std::error::Error for ShutdownError {}

/// Drives a `SweepController` on a fixed interval.
pub struct SweepScheduler<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    controller: Arc<SweepController<S>>,
    config: SchedulerConfig,
}

impl<S> SweepScheduler<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    pub fn new(controller: Arc<SweepController<S>>, config: SchedulerConfig) -> Self {
        Self { controller, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Spawn the sweep task on the current tokio runtime.
    ///
    /// The first sweep runs one interval after this call, then every
    /// interval. Dropping the returned handle detaches the task; call
    /// [`SchedulerHandle::shutdown`] to stop it.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[cfg(feature = "async")]
    pub fn start(self) -> SchedulerHandle
    where
        S: 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let period = self.config.interval;
        let controller = self.controller;
        let first_tick = tokio::time::Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            let mut detached = false;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        controller.sweep();
                    }
                    changed = shutdown_rx.changed(), if !detached => {
                        match changed {
                            Ok(()) if *shutdown_rx.borrow() => break,
                            Ok(()) => {}
                            // Handle dropped without shutdown: keep sweeping.
                            Err(_) => detached = true,
                        }
                    }
                }
            }

            tracing::debug!(target: "log_governor::scheduler", "sweep task stopped");
        });

        tracing::debug!(
            target: "log_governor::scheduler",
            interval_ms = period.as_millis() as u64,
            "sweep task started"
        );

        SchedulerHandle {
            shutdown_tx,
            task,
        }
    }
}

/// Handle to a running sweep task.
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

#[cfg(feature = "async")]
impl SchedulerHandle {
    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal the task to stop and wait for it.
    ///
    /// A sweep already in progress completes first.
    ///
    /// # Errors
    /// Returns a `ShutdownError` if the task panicked or was cancelled.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        // The receiver is gone only if the task already ended.
        let _ = self.shutdown_tx.send(true);
        self.task.await.map_err(|err| {
            if err.is_panic() {
                ShutdownError::TaskPanicked
            } else {
                ShutdownError::TaskCancelled
            }
        })
    }
}
