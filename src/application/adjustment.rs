//! Global feedback: shrink the noisiest loggers' budgets.
//!
//! After every sweep the policy compares the window's global total against
//! the global limit. Once the overflow has stayed above the threshold for
//! enough consecutive windows, it cuts the non-critical limit of the top
//! ranked loggers until the overflow is absorbed or the per-sweep offender
//! cap is reached. Limits only ever go down.

use crate::application::ports::LogBackend;
use crate::application::sweep::RankingEntry;
use crate::domain::identity::LoggerIdentity;
use crate::domain::overflow::{AdjustmentConfig, AdjustmentConfigError, OverflowTracker};
use crate::domain::record::LogRecord;
use crate::domain::summary::{LimitReduction, LIMIT_REDUCED_NOTICE, REDUCTION_NOTICE};
use std::fmt::Display;

/// Hysteresis state plus the reduction rule.
///
/// Single-writer: callers must not run `apply` concurrently. The sweep
/// controller serializes this for you.
#[derive(Debug, Clone)]
pub struct AdjustmentPolicy {
    config: AdjustmentConfig,
    tracker: OverflowTracker,
    notice_identity: LoggerIdentity,
}

impl AdjustmentPolicy {
    /// Create a policy with a fresh streak.
    ///
    /// # Errors
    /// Returns an `AdjustmentConfigError` if `config` fails
    /// [`AdjustmentConfig::validate`].
    pub fn new(config: AdjustmentConfig) -> Result<Self, AdjustmentConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            tracker: OverflowTracker::new(),
            notice_identity: LoggerIdentity::governor(),
        })
    }

    pub fn config(&self) -> &AdjustmentConfig {
        &self.config
    }

    /// Consecutive overflowing windows seen so far.
    pub fn streak(&self) -> u32 {
        self.tracker.streak()
    }

    /// Feed one sweep's result and reduce limits if the streak is long enough.
    ///
    /// `rankings` must be ordered noisiest first. Notices are sent through
    /// `backend` under the governor's own identity.
    pub fn apply(
        &mut self,
        rankings: &[RankingEntry],
        global_total: u64,
        global_limit: u64,
        backend: &dyn LogBackend,
    ) -> Vec<LimitReduction> {
        let Some(mut overflow) = self
            .tracker
            .observe(global_total, global_limit, &self.config)
        else {
            return Vec::new();
        };

        backend.forward(&self.notice_identity, &LogRecord::info(REDUCTION_NOTICE));

        let mut reductions = Vec::new();
        for entry in rankings {
            let logger = &entry.logger;
            let previous_limit = logger.non_critical_limit();
            let reduced_by = self.config.reduction_for(previous_limit);
            logger.set_non_critical_limit(previous_limit - reduced_by);

            let args: [&dyn Display; 2] = [&reduced_by, logger.identity()];
            backend.forward(
                &self.notice_identity,
                &LogRecord::info(LIMIT_REDUCED_NOTICE).with_args(&args),
            );

            reductions.push(LimitReduction {
                identity: logger.identity().clone(),
                previous_limit,
                reduced_by,
            });

            overflow = overflow.saturating_sub(i64::try_from(reduced_by).unwrap_or(i64::MAX));
            if overflow <= 0 || reductions.len() >= self.config.max_offenders {
                break;
            }
        }
        reductions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gate::GatedLogger;
    use crate::application::metrics::Metrics;
    use crate::domain::limits::LoggerLimits;
    use crate::infrastructure::mocks::RecordingBackend;
    use std::sync::Arc;

    fn entry(
        backend: &Arc<RecordingBackend>,
        name: &'static str,
        limit: u64,
        count: u64,
    ) -> RankingEntry {
        RankingEntry {
            logger: Arc::new(GatedLogger::new(
                LoggerIdentity::named(name),
                LoggerLimits::new(limit, 1).unwrap(),
                backend.clone(),
                Metrics::new(),
            )),
            non_critical_count: count,
        }
    }

    #[test]
    fn test_no_reduction_before_streak() {
        let backend = Arc::new(RecordingBackend::new());
        let mut policy = AdjustmentPolicy::new(AdjustmentConfig::default()).unwrap();
        let rankings = vec![entry(&backend, "noisy", 100, 1000)];

        for _ in 0..4 {
            assert!(policy.apply(&rankings, 1000, 100, &*backend).is_empty());
        }
        assert_eq!(policy.streak(), 4);
        assert_eq!(rankings[0].logger.non_critical_limit(), 100);
        assert_eq!(backend.count(), 0);
    }

    #[test]
    fn test_reduces_on_fifth_overflow() {
        let backend = Arc::new(RecordingBackend::new());
        let mut policy = AdjustmentPolicy::new(AdjustmentConfig::default()).unwrap();
        let rankings = vec![entry(&backend, "noisy", 100, 1000)];

        for _ in 0..4 {
            policy.apply(&rankings, 1000, 100, &*backend);
        }
        let reductions = policy.apply(&rankings, 1000, 100, &*backend);

        assert_eq!(reductions.len(), 1);
        assert_eq!(reductions[0].previous_limit, 100);
        assert_eq!(reductions[0].reduced_by, 5);
        assert_eq!(rankings[0].logger.non_critical_limit(), 95);
        assert_eq!(rankings[0].logger.critical_limit(), 1);

        let messages = backend.messages_for(&LoggerIdentity::governor());
        assert_eq!(
            messages,
            [
                REDUCTION_NOTICE.to_string(),
                "reducing non-critical message limit by 5 for logger noisy".to_string(),
            ]
        );
    }

    #[test]
    fn test_stops_at_max_offenders() {
        let backend = Arc::new(RecordingBackend::new());
        let config = AdjustmentConfig {
            streak_threshold: 1,
            max_offenders: 2,
            ..AdjustmentConfig::default()
        };
        let mut policy = AdjustmentPolicy::new(config).unwrap();
        let rankings = vec![
            entry(&backend, "a", 100, 900),
            entry(&backend, "b", 100, 800),
            entry(&backend, "c", 100, 700),
        ];

        let reductions = policy.apply(&rankings, 100_000, 100, &*backend);

        assert_eq!(reductions.len(), 2);
        assert_eq!(rankings[0].logger.non_critical_limit(), 95);
        assert_eq!(rankings[1].logger.non_critical_limit(), 95);
        assert_eq!(rankings[2].logger.non_critical_limit(), 100);
    }

    #[test]
    fn test_stops_once_overflow_absorbed() {
        let backend = Arc::new(RecordingBackend::new());
        let config = AdjustmentConfig {
            streak_threshold: 1,
            ..AdjustmentConfig::default()
        };
        let mut policy = AdjustmentPolicy::new(config).unwrap();
        let rankings = vec![
            entry(&backend, "a", 1000, 900),
            entry(&backend, "b", 1000, 800),
        ];

        // Overflow of 30 on a limit of 100; the first cut of 50 absorbs it.
        let reductions = policy.apply(&rankings, 130, 100, &*backend);

        assert_eq!(reductions.len(), 1);
        assert_eq!(rankings[0].logger.non_critical_limit(), 950);
        assert_eq!(rankings[1].logger.non_critical_limit(), 1000);
    }

    #[test]
    fn test_zero_reduction_still_counts_as_offender() {
        let backend = Arc::new(RecordingBackend::new());
        let mut policy = AdjustmentPolicy::new(AdjustmentConfig {
            streak_threshold: 1,
            ..AdjustmentConfig::default()
        })
        .unwrap();
        let rankings = vec![entry(&backend, "small", 19, 100)];

        let reductions = policy.apply(&rankings, 100, 50, &*backend);
        assert_eq!(reductions.len(), 1);
        assert_eq!(reductions[0].reduced_by, 0);
        assert_eq!(rankings[0].logger.non_critical_limit(), 19);
    }

    #[test]
    fn test_calm_window_resets_streak() {
        let backend = Arc::new(RecordingBackend::new());
        let mut policy = AdjustmentPolicy::new(AdjustmentConfig::default()).unwrap();

        for _ in 0..4 {
            policy.apply(&[], 1000, 100, &*backend);
        }
        policy.apply(&[], 0, 100, &*backend);
        assert_eq!(policy.streak(), 0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        for reduction_percent in [0, 100, 150] {
            let config = AdjustmentConfig {
                reduction_percent,
                ..AdjustmentConfig::default()
            };
            assert_eq!(
                AdjustmentPolicy::new(config).unwrap_err(),
                AdjustmentConfigError::InvalidReductionPercent
            );
        }

        let config = AdjustmentConfig {
            max_offenders: 0,
            ..AdjustmentConfig::default()
        };
        assert_eq!(
            AdjustmentPolicy::new(config).unwrap_err(),
            AdjustmentConfigError::ZeroMaxOffenders
        );
    }

    #[test]
    fn test_largest_cut_keeps_limit_positive() {
        let backend = Arc::new(RecordingBackend::new());
        let mut policy = AdjustmentPolicy::new(AdjustmentConfig {
            streak_threshold: 1,
            reduction_percent: 99,
            ..AdjustmentConfig::default()
        })
        .unwrap();
        let rankings = vec![entry(&backend, "tiny", 1, 100), entry(&backend, "big", 100, 90)];

        policy.apply(&rankings, 100_000, 100, &*backend);

        assert_eq!(rankings[0].logger.non_critical_limit(), 1);
        assert_eq!(rankings[1].logger.non_critical_limit(), 1);
    }
}
