//! The sweep: close one window across every logger.
//!
//! A sweep reads and zeroes each logger's counters, reports loggers that
//! dropped messages, ranks loggers by non-critical volume and hands the
//! ranking to the adjustment policy.

use crate::application::adjustment::AdjustmentPolicy;
use crate::application::gate::GatedLogger;
use crate::application::ports::Storage;
use crate::application::registry::LoggerRegistry;
use crate::domain::identity::LoggerIdentity;
use crate::domain::overflow::{AdjustmentConfig, AdjustmentConfigError};
use crate::domain::record::LogRecord;
use crate::domain::summary::{SuppressionReport, SweepSummary, SUPPRESSED_NOTICE};
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// One logger's non-critical volume in the window just closed.
///
/// Lives only for the duration of one sweep.
#[derive(Debug, Clone)]
pub struct RankingEntry {
    pub logger: Arc<GatedLogger>,
    pub non_critical_count: u64,
}

impl RankingEntry {
    /// Noisiest first, ties broken by identity ascending.
    fn rank(a: &RankingEntry, b: &RankingEntry) -> Ordering {
        b.non_critical_count
            .cmp(&a.non_critical_count)
            .then_with(|| a.logger.identity().cmp(b.logger.identity()))
    }
}

/// Runs sweeps over a registry.
///
/// Sweeps are serialized: the adjustment policy's streak sits behind a
/// mutex, so the scheduler and any on-demand caller can share one
/// controller. Application threads emitting logs never touch that lock.
pub struct SweepController<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    registry: Arc<LoggerRegistry<S>>,
    policy: Mutex<AdjustmentPolicy>,
}

impl<S> SweepController<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    /// # Errors
    /// Returns an `AdjustmentConfigError` if `config` is out of range.
    pub fn new(
        registry: Arc<LoggerRegistry<S>>,
        config: AdjustmentConfig,
    ) -> Result<Self, AdjustmentConfigError> {
        Ok(Self {
            registry,
            policy: Mutex::new(AdjustmentPolicy::new(config)?),
        })
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry<S>> {
        &self.registry
    }

    /// Consecutive overflowing windows seen so far.
    pub fn streak(&self) -> u32 {
        self.lock_policy().streak()
    }

    /// Close the current window and run the adjustment policy.
    pub fn sweep(&self) -> SweepSummary {
        let mut policy = self.lock_policy();
        let backend = self.registry.backend();

        let mut global_total: u64 = 0;
        let mut rankings = Vec::new();
        let mut suppressed = Vec::new();

        for logger in self.registry.snapshot() {
            let window = logger.take_window();

            if let Some(report) = SuppressionReport::from_window(
                logger.identity(),
                window.non_critical,
                logger.non_critical_limit(),
                window.critical,
                logger.critical_limit(),
            ) {
                let args: [&dyn Display; 2] = [&report.critical, &report.non_critical];
                backend.forward(
                    logger.identity(),
                    &LogRecord::info(SUPPRESSED_NOTICE).with_args(&args),
                );
                suppressed.push(report);
            }

            global_total = global_total.saturating_add(window.total());
            if window.non_critical > 0 {
                rankings.push(RankingEntry {
                    non_critical_count: window.non_critical,
                    logger,
                });
            }
        }

        rankings.sort_by(RankingEntry::rank);

        let global_limit = self.registry.global_limit();
        let reductions = policy.apply(&rankings, global_total, global_limit, backend.as_ref());

        let metrics = self.registry.metrics();
        metrics.record_sweep();
        metrics.record_reductions(reductions.iter().filter(|r| r.reduced_by > 0).count() as u64);

        debug!(
            target: "log_governor::sweep",
            global_total,
            global_limit,
            loggers = self.registry.len(),
            suppressed = suppressed.len(),
            reductions = reductions.len(),
            streak = policy.streak(),
            "sweep completed"
        );

        SweepSummary {
            global_total,
            global_limit,
            ranked: rankings
                .iter()
                .map(|entry| (entry.logger.identity().clone(), entry.non_critical_count))
                .collect(),
            suppressed,
            reductions,
            streak: policy.streak(),
        }
    }

    fn lock_policy(&self) -> std::sync::MutexGuard<'_, AdjustmentPolicy> {
        // A panicked sweep leaves at worst a stale streak.
        self.policy.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> fmt::Debug for SweepController<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepController")
            .field("registry", &self.registry)
            .field("streak", &self.streak())
            .finish()
    }
}
