//! Mock tracing layer for testing.

use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::Layer;

/// Mock layer that captures events for testing.
#[derive(Clone)]
pub struct MockCaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Captured event information.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// The `logger` field, when the event carries one
    pub logger: Option<String>,
}

const POISONED: &str =
    "MockCaptureLayer mutex poisoned - a test thread panicked while holding the lock";

impl MockCaptureLayer {
    /// Create a new mock capture layer.
    pub fn new() -> Self {
        Self {
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all captured events.
    pub fn get_captured(&self) -> Vec<CapturedEvent> {
        self.captured.lock().expect(POISONED).clone()
    }

    /// Get the count of captured events.
    pub fn count(&self) -> usize {
        self.captured.lock().expect(POISONED).len()
    }

    /// Count captured events whose target is `target`.
    pub fn count_for_target(&self, target: &str) -> usize {
        self.captured
            .lock()
            .expect(POISONED)
            .iter()
            .filter(|event| event.target == target)
            .count()
    }

    /// Clear all captured events.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_governor::infrastructure::mocks::MockCaptureLayer;
    /// use tracing::info;
    /// use tracing_subscriber::layer::SubscriberExt;
    ///
    /// let capture = MockCaptureLayer::new();
    /// let subscriber = tracing_subscriber::registry().with(capture.clone());
    ///
    /// tracing::subscriber::with_default(subscriber, || {
    ///     info!("test message");
    ///     assert_eq!(capture.count(), 1);
    ///
    ///     capture.clear();
    ///     assert_eq!(capture.count(), 0);
    /// });
    /// ```
    pub fn clear(&self) {
        self.captured.lock().expect(POISONED).clear();
    }
}

impl Default for MockCaptureLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for MockCaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        self.captured.lock().expect(POISONED).push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            logger: visitor.logger,
        });
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    logger: Option<String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "logger" => self.logger = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "logger" => self.logger = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}
