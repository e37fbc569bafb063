//! Per-logger and global message limits.

use std::fmt;

/// Default non-critical messages allowed per logger per window.
pub const DEFAULT_NON_CRITICAL_LIMIT: u64 = 100;

/// Default critical (error) messages allowed per logger per window.
pub const DEFAULT_CRITICAL_LIMIT: u64 = 100;

/// Default total messages allowed across all loggers per window.
pub const DEFAULT_GLOBAL_LIMIT: u64 = 10_000;

/// Error returned when a limit fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitError {
    /// Non-critical limit must be greater than zero
    ZeroNonCriticalLimit,
    /// Critical limit must be greater than zero
    ZeroCriticalLimit,
    /// Global limit must be greater than zero
    ZeroGlobalLimit,
}

impl fmt::Display for LimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitError::ZeroNonCriticalLimit => {
                write!(f, "non-critical limit must be greater than 0")
            }
            LimitError::ZeroCriticalLimit => write!(f, "critical limit must be greater than 0"),
            LimitError::ZeroGlobalLimit => write!(f, "global limit must be greater than 0"),
        }
    }
}

impl std::error::Error for LimitError {}

/// Validated per-window limits for one logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerLimits {
    non_critical: u64,
    critical: u64,
}

impl LoggerLimits {
    /// Create limits, rejecting zero for either class.
    ///
    /// # Errors
    /// Returns `LimitError::ZeroNonCriticalLimit` or
    /// `LimitError::ZeroCriticalLimit` for a zero argument.
    pub fn new(non_critical: u64, critical: u64) -> Result<Self, LimitError> {
        if non_critical == 0 {
            return Err(LimitError::ZeroNonCriticalLimit);
        }
        if critical == 0 {
            return Err(LimitError::ZeroCriticalLimit);
        }
        Ok(Self {
            non_critical,
            critical,
        })
    }

    pub fn non_critical(&self) -> u64 {
        self.non_critical
    }

    pub fn critical(&self) -> u64 {
        self.critical
    }
}

impl Default for LoggerLimits {
    fn default() -> Self {
        Self {
            non_critical: DEFAULT_NON_CRITICAL_LIMIT,
            critical: DEFAULT_CRITICAL_LIMIT,
        }
    }
}

/// Validate a global limit.
///
/// # Errors
/// Returns `LimitError::ZeroGlobalLimit` if `limit` is zero.
pub fn validate_global_limit(limit: u64) -> Result<u64, LimitError> {
    if limit == 0 {
        Err(LimitError::ZeroGlobalLimit)
    } else {
        Ok(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = LoggerLimits::default();
        assert_eq!(limits.non_critical(), 100);
        assert_eq!(limits.critical(), 100);
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert_eq!(
            LoggerLimits::new(0, 10),
            Err(LimitError::ZeroNonCriticalLimit)
        );
        assert_eq!(LoggerLimits::new(1, 0), Err(LimitError::ZeroCriticalLimit));
        assert_eq!(
            LoggerLimits::new(0, 0),
            Err(LimitError::ZeroNonCriticalLimit)
        );
    }

    #[test]
    fn test_valid_limits() {
        let limits = LoggerLimits::new(20, 1).unwrap();
        assert_eq!(limits.non_critical(), 20);
        assert_eq!(limits.critical(), 1);
    }

    #[test]
    fn test_global_limit_validation() {
        assert_eq!(validate_global_limit(0), Err(LimitError::ZeroGlobalLimit));
        assert_eq!(validate_global_limit(50), Ok(50));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LimitError::ZeroGlobalLimit.to_string(),
            "global limit must be greater than 0"
        );
    }
}
