//! Registry of gated loggers.
//!
//! The registry hands out one `GatedLogger` per identity and holds the
//! process-wide global limit that sweeps compare total traffic against.
//! Entries are never removed.

use crate::application::gate::GatedLogger;
use crate::application::metrics::Metrics;
use crate::application::ports::{LogBackend, Storage};
use crate::domain::identity::LoggerIdentity;
use crate::domain::limits::{validate_global_limit, LimitError, LoggerLimits};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The process-wide message budget per window.
#[derive(Debug)]
pub struct GlobalBudget {
    limit: AtomicU64,
}

impl GlobalBudget {
    /// # Errors
    /// Returns `LimitError::ZeroGlobalLimit` if `limit` is zero.
    pub fn new(limit: u64) -> Result<Self, LimitError> {
        Ok(Self {
            limit: AtomicU64::new(validate_global_limit(limit)?),
        })
    }

    pub fn get(&self) -> u64 {
        self.limit.load(Ordering::Relaxed)
    }

    /// Replace the limit. On error the previous value is kept.
    pub fn set(&self, limit: u64) -> Result<(), LimitError> {
        self.limit
            .store(validate_global_limit(limit)?, Ordering::Relaxed);
        Ok(())
    }
}

/// Registry mapping identities to their gated loggers.
///
/// Uses the Storage port for concurrent access. Lookups for an existing
/// identity never allocate; the first caller for a new identity creates its
/// logger and every later caller (including racing ones) gets that same
/// instance, whatever limits they asked for.
pub struct LoggerRegistry<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    storage: S,
    backend: Arc<dyn LogBackend>,
    default_limits: LoggerLimits,
    global: GlobalBudget,
    metrics: Metrics,
}

impl<S> LoggerRegistry<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    /// Create a registry.
    ///
    /// # Arguments
    /// * `storage` - Backing map for the loggers
    /// * `backend` - Where every created logger forwards to
    /// * `default_limits` - Limits for loggers created without explicit ones
    /// * `global_limit` - Initial process-wide budget per window
    ///
    /// # Errors
    /// Returns `LimitError::ZeroGlobalLimit` if `global_limit` is zero.
    pub fn new(
        storage: S,
        backend: Arc<dyn LogBackend>,
        default_limits: LoggerLimits,
        global_limit: u64,
    ) -> Result<Self, LimitError> {
        Ok(Self {
            storage,
            backend,
            default_limits,
            global: GlobalBudget::new(global_limit)?,
            metrics: Metrics::new(),
        })
    }

    /// Get the logger for `identity`, creating it with the default limits.
    pub fn get_or_create(&self, identity: impl Into<LoggerIdentity>) -> Arc<GatedLogger> {
        self.insert_or_get(identity.into(), self.default_limits)
    }

    /// Get the logger for `identity`, creating it with the given limits.
    ///
    /// The limits are validated on every call, but only applied if this call
    /// is the one that creates the logger.
    ///
    /// # Errors
    /// Returns a `LimitError` if either limit is zero.
    pub fn get_or_create_with_limits(
        &self,
        identity: impl Into<LoggerIdentity>,
        non_critical_limit: u64,
        critical_limit: u64,
    ) -> Result<Arc<GatedLogger>, LimitError> {
        let limits = LoggerLimits::new(non_critical_limit, critical_limit)?;
        Ok(self.insert_or_get(identity.into(), limits))
    }

    /// Get the logger for a borrowed name, creating it with default limits.
    ///
    /// Only allocates the identity when the name is new.
    pub fn get_or_create_by_name(&self, name: &str) -> Arc<GatedLogger> {
        match self.storage.get(name) {
            Some(logger) => logger,
            None => self.insert_or_get(
                LoggerIdentity::named(name.to_owned()),
                self.default_limits,
            ),
        }
    }

    /// Look up an existing logger.
    pub fn get(&self, name: &str) -> Option<Arc<GatedLogger>> {
        self.storage.get(name)
    }

    fn insert_or_get(&self, identity: LoggerIdentity, limits: LoggerLimits) -> Arc<GatedLogger> {
        let mut created = false;
        let logger = self.storage.get_or_insert_with(identity.clone(), || {
            created = true;
            Arc::new(GatedLogger::new(
                identity.clone(),
                limits,
                Arc::clone(&self.backend),
                self.metrics.clone(),
            ))
        });
        if created {
            tracing::trace!(
                target: "log_governor::registry",
                identity = %identity,
                non_critical_limit = limits.non_critical(),
                critical_limit = limits.critical(),
                "registered logger"
            );
        }
        logger
    }

    /// Replace the global limit.
    ///
    /// # Errors
    /// Returns `LimitError::ZeroGlobalLimit` if `limit` is zero; the previous
    /// value is kept.
    pub fn set_global_limit(&self, limit: u64) -> Result<(), LimitError> {
        self.global.set(limit)
    }

    pub fn global_limit(&self) -> u64 {
        self.global.get()
    }

    pub fn default_limits(&self) -> LoggerLimits {
        self.default_limits
    }

    /// Clone out every logger currently registered.
    ///
    /// Loggers registered while this runs may or may not be included.
    pub fn snapshot(&self) -> Vec<Arc<GatedLogger>> {
        let mut loggers = Vec::with_capacity(self.storage.len());
        self.storage.for_each(|_, logger| loggers.push(Arc::clone(logger)));
        loggers
    }

    /// Visit every registered logger.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<GatedLogger>),
    {
        self.storage.for_each(|_, logger| f(logger));
    }

    /// Number of registered loggers.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn backend(&self) -> &Arc<dyn LogBackend> {
        &self.backend
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<S> fmt::Debug for LoggerRegistry<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.storage.len())
            .field("default_limits", &self.default_limits)
            .field("global_limit", &self.global_limit())
            .finish()
    }
}
