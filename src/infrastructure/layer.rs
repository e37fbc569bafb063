//! Tracing integration filter.
//!
//! Provides a per-layer `Filter` that gates `tracing` events through the
//! governor. Each event's target is used as its logger identity, so every
//! module path gets its own budget, and error events are charged against the
//! critical limit.

use crate::application::gate::GatedLogger;
use crate::application::ports::Storage;
use crate::application::registry::LoggerRegistry;
use crate::domain::identity::{LoggerIdentity, GOVERNOR_TARGET};
use crate::domain::record::Level;

use std::fmt;
use std::sync::Arc;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Filter};

/// Whether events from `target` bypass the governor.
///
/// The governor's own diagnostics and forwarded records live under the
/// `log_governor` target and its submodules.
pub fn is_exempt(target: &str) -> bool {
    match target.strip_prefix(GOVERNOR_TARGET) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// A `tracing_subscriber` filter that applies per-target message limits.
///
/// Loggers created for new targets use the registry's default limits. The
/// filter only counts and compares; level filtering is left to the rest of
/// the subscriber stack.
///
/// # Example
///
/// ```no_run
/// use log_governor::LogGovernor;
/// use tracing_subscriber::prelude::*;
///
/// let governor = LogGovernor::builder()
///     .with_default_limits(200, 50)
///     .build()
///     .unwrap();
///
/// tracing_subscriber::registry()
///     .with(tracing_subscriber::fmt::layer().with_filter(governor.filter()))
///     .init();
/// ```
pub struct GovernorFilter<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    registry: Arc<LoggerRegistry<S>>,
}

impl<S> GovernorFilter<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    pub fn new(registry: Arc<LoggerRegistry<S>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry<S>> {
        &self.registry
    }

    /// Count one event from `target` at `level` and decide whether it passes.
    pub fn should_allow(&self, target: &str, level: Level) -> bool {
        if is_exempt(target) {
            return true;
        }
        let logger = self.registry.get_or_create_by_name(target);
        let allowed = logger.admit(level).is_allow();
        if allowed {
            self.registry.metrics().record_forwarded();
        } else {
            self.registry.metrics().record_suppressed();
        }
        allowed
    }
}

impl<S> Clone for GovernorFilter<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S> fmt::Debug for GovernorFilter<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GovernorFilter")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<S, Sub> Filter<Sub> for GovernorFilter<S>
where
    S: Storage<LoggerIdentity, Arc<GatedLogger>>,
    Sub: Subscriber,
{
    fn enabled(&self, _meta: &Metadata<'_>, _cx: &Context<'_, Sub>) -> bool {
        // Counting happens per event in event_enabled
        true
    }

    fn event_enabled(&self, event: &tracing::Event<'_>, _cx: &Context<'_, Sub>) -> bool {
        let metadata = event.metadata();
        self.should_allow(metadata.target(), Level::from(metadata.level()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::limits::LoggerLimits;
    use crate::infrastructure::mocks::{MockCaptureLayer, RecordingBackend};
    use crate::infrastructure::storage::ShardedStorage;
    use tracing::{error, info, warn};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Layer;

    type TestStorage = ShardedStorage<LoggerIdentity, Arc<GatedLogger>>;

    fn filter(nc: u64, c: u64) -> GovernorFilter<TestStorage> {
        let registry = LoggerRegistry::new(
            ShardedStorage::new(),
            Arc::new(RecordingBackend::new()),
            LoggerLimits::new(nc, c).unwrap(),
            10_000,
        )
        .unwrap();
        GovernorFilter::new(Arc::new(registry))
    }

    #[test]
    fn test_exempt_targets() {
        assert!(is_exempt("log_governor"));
        assert!(is_exempt("log_governor::sweep"));
        assert!(!is_exempt("log_governor_extras"));
        assert!(!is_exempt("app::log_governor"));
        assert!(!is_exempt("app"));
    }

    #[test]
    fn test_should_allow_counts_per_target() {
        let filter = filter(2, 1);

        assert!(filter.should_allow("app::a", Level::Info));
        assert!(filter.should_allow("app::a", Level::Debug));
        assert!(!filter.should_allow("app::a", Level::Warn));
        assert!(filter.should_allow("app::b", Level::Info));

        assert!(filter.should_allow("app::a", Level::Error));
        assert!(!filter.should_allow("app::a", Level::Error));

        let a = filter.registry().get("app::a").unwrap();
        assert_eq!(a.non_critical_count(), 3);
        assert_eq!(a.critical_count(), 2);
        assert_eq!(filter.registry().metrics().events_suppressed(), 2);
    }

    #[test]
    fn test_exempt_events_are_not_registered() {
        let filter = filter(1, 1);
        for _ in 0..10 {
            assert!(filter.should_allow("log_governor::sweep", Level::Debug));
        }
        assert!(filter.registry().is_empty());
    }

    #[test]
    fn test_filter_gates_layer() {
        let filter = filter(3, 1);
        let capture = MockCaptureLayer::new();
        let subscriber =
            tracing_subscriber::registry().with(capture.clone().with_filter(filter.clone()));

        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..10 {
                info!(target: "app::noisy", "chatter");
            }
            warn!(target: "app::quiet", "rare");
            error!(target: "app::noisy", "first failure");
            error!(target: "app::noisy", "second failure");
        });

        assert_eq!(capture.count_for_target("app::noisy"), 4);
        assert_eq!(capture.count_for_target("app::quiet"), 1);
        assert_eq!(filter.registry().len(), 2);
    }
}
