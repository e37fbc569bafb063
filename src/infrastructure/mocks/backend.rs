//! Recording backend for testing.

use crate::application::ports::LogBackend;
use crate::domain::identity::{LoggerIdentity, Marker};
use crate::domain::record::{Level, LogRecord};
use crate::infrastructure::backend::render;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Owned copy of one forwarded record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RecordedEvent {
    pub identity: LoggerIdentity,
    pub level: Level,
    pub marker: Option<Marker>,
    pub template: String,
    pub args: Vec<String>,
    pub error: Option<String>,
    /// Template with the arguments filled in
    pub message: String,
}

/// Backend that keeps every forwarded record in memory.
///
/// Clones share the same buffer. Levels and markers can be disabled to
/// exercise the gate's enabled check.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
    disabled_levels: Arc<Mutex<BTreeSet<Level>>>,
    disabled_markers: Arc<Mutex<BTreeSet<Marker>>>,
}

const POISONED: &str =
    "RecordingBackend mutex poisoned - a test thread panicked while holding the lock";

impl RecordingBackend {
    /// Create a backend with every level enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `level` as disabled from now on.
    pub fn disable(&self, level: Level) {
        self.disabled_levels.lock().expect(POISONED).insert(level);
    }

    /// Report any call carrying `marker` as disabled from now on.
    pub fn disable_marker(&self, marker: Marker) {
        self.disabled_markers.lock().expect(POISONED).insert(marker);
    }

    /// Get all recorded events.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect(POISONED).clone()
    }

    /// Recorded events forwarded on behalf of `identity`.
    pub fn events_for(&self, identity: &LoggerIdentity) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .expect(POISONED)
            .iter()
            .filter(|event| &event.identity == identity)
            .cloned()
            .collect()
    }

    /// Rendered messages forwarded on behalf of `identity`, in order.
    pub fn messages_for(&self, identity: &LoggerIdentity) -> Vec<String> {
        self.events_for(identity)
            .into_iter()
            .map(|event| event.message)
            .collect()
    }

    /// Get the count of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().expect(POISONED).len()
    }

    /// Count of recorded events forwarded on behalf of `identity`.
    pub fn count_for(&self, identity: &LoggerIdentity) -> usize {
        self.events
            .lock()
            .expect(POISONED)
            .iter()
            .filter(|event| &event.identity == identity)
            .count()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.lock().expect(POISONED).clear();
    }
}

impl LogBackend for RecordingBackend {
    fn is_enabled(
        &self,
        _identity: &LoggerIdentity,
        level: Level,
        marker: Option<&Marker>,
    ) -> bool {
        if self.disabled_levels.lock().expect(POISONED).contains(&level) {
            return false;
        }
        match marker {
            Some(marker) => !self.disabled_markers.lock().expect(POISONED).contains(marker),
            None => true,
        }
    }

    fn forward(&self, identity: &LoggerIdentity, record: &LogRecord<'_>) {
        let event = RecordedEvent {
            identity: identity.clone(),
            level: record.level(),
            marker: record.marker().cloned(),
            template: record.template().to_string(),
            args: record.args().iter().map(|arg| arg.to_string()).collect(),
            error: record.attached_error().map(|err| err.to_string()),
            message: render(record.template(), record.args()),
        };
        self.events.lock().expect(POISONED).push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[test]
    fn test_records_forwarded_calls() {
        let backend = RecordingBackend::new();
        let identity = LoggerIdentity::named("svc");
        let args: [&dyn fmt::Display; 1] = [&"x"];

        backend.forward(&identity, &LogRecord::info("got {}").with_args(&args));

        assert_eq!(backend.count(), 1);
        assert_eq!(backend.count_for(&identity), 1);
        assert_eq!(backend.messages_for(&identity), ["got x"]);
        assert_eq!(backend.events()[0].args, ["x"]);

        backend.clear();
        assert_eq!(backend.count(), 0);
    }

    #[test]
    fn test_disabled_levels_and_markers() {
        let backend = RecordingBackend::new();
        let identity = LoggerIdentity::named("svc");
        let audit = Marker::new("AUDIT");

        backend.disable(Level::Trace);
        backend.disable_marker(audit.clone());

        assert!(!backend.is_enabled(&identity, Level::Trace, None));
        assert!(backend.is_enabled(&identity, Level::Info, None));
        assert!(!backend.is_enabled(&identity, Level::Info, Some(&audit)));
        assert!(backend.is_enabled(&identity, Level::Info, Some(&Marker::new("OTHER"))));
    }
}
