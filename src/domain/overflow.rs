//! Overflow detection with hysteresis.
//!
//! A single noisy window is not enough to start shedding load. The tracker
//! counts consecutive windows whose global total overshoots the budget by more
//! than a threshold fraction, and only reports a reduction once that streak
//! reaches the configured length. Any calm window resets the streak.

use std::fmt;

/// Error returned when adjustment configuration validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentConfigError {
    /// Overflow threshold must be a finite, non-negative fraction
    InvalidOverflowThreshold,
    /// Streak threshold must be greater than zero
    ZeroStreakThreshold,
    /// At least one offender must be adjustable per sweep
    ZeroMaxOffenders,
    /// Reduction percentage must be within 1..=99
    InvalidReductionPercent,
}

impl fmt::Display for AdjustmentConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentConfigError::InvalidOverflowThreshold => {
                write!(f, "overflow threshold must be a finite, non-negative fraction")
            }
            AdjustmentConfigError::ZeroStreakThreshold => {
                write!(f, "streak threshold must be greater than 0")
            }
            AdjustmentConfigError::ZeroMaxOffenders => {
                write!(f, "max offenders must be greater than 0")
            }
            AdjustmentConfigError::InvalidReductionPercent => {
                write!(f, "reduction percent must be between 1 and 99")
            }
        }
    }
}

impl std::error::Error for AdjustmentConfigError {}

/// Tuning knobs for the adjustment policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentConfig {
    /// Fraction of the global limit the total must exceed it by to count as overflow
    pub overflow_threshold: f64,
    /// Consecutive overflowing sweeps before limits are reduced
    pub streak_threshold: u32,
    /// Maximum number of loggers adjusted in one sweep
    pub max_offenders: usize,
    /// Percentage of a logger's non-critical limit removed per adjustment
    pub reduction_percent: u64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            overflow_threshold: 0.2,
            streak_threshold: 5,
            max_offenders: 5,
            reduction_percent: 5,
        }
    }
}

impl AdjustmentConfig {
    /// Check every field is within range.
    ///
    /// # Errors
    /// Returns the first `AdjustmentConfigError` found.
    pub fn validate(&self) -> Result<(), AdjustmentConfigError> {
        if !self.overflow_threshold.is_finite() || self.overflow_threshold < 0.0 {
            return Err(AdjustmentConfigError::InvalidOverflowThreshold);
        }
        if self.streak_threshold == 0 {
            return Err(AdjustmentConfigError::ZeroStreakThreshold);
        }
        if self.max_offenders == 0 {
            return Err(AdjustmentConfigError::ZeroMaxOffenders);
        }
        if !(1..=99).contains(&self.reduction_percent) {
            return Err(AdjustmentConfigError::InvalidReductionPercent);
        }
        Ok(())
    }

    /// How much to take off a non-critical limit, rounded down.
    ///
    /// Always strictly less than `limit`, so a positive limit stays positive.
    pub fn reduction_for(&self, limit: u64) -> u64 {
        (u128::from(limit) * u128::from(self.reduction_percent) / 100) as u64
    }
}

/// Tracks the streak of consecutive overflowing windows.
///
/// Owned by the single sweep path; no synchronization of its own.
#[derive(Debug, Clone, Default)]
pub struct OverflowTracker {
    streak: u32,
}

impl OverflowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current streak length.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Feed one window's global total.
    ///
    /// Returns `Some(overflow)` when the streak has reached the threshold and
    /// limits should be reduced, where `overflow` is the amount the total
    /// exceeded `global_limit` by.
    pub fn observe(
        &mut self,
        global_total: u64,
        global_limit: u64,
        config: &AdjustmentConfig,
    ) -> Option<i64> {
        let overflow = signed(global_total).saturating_sub(signed(global_limit));

        if overflow as f64 > global_limit as f64 * config.overflow_threshold {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
        }

        if self.streak >= config.streak_threshold {
            Some(overflow)
        } else {
            None
        }
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
