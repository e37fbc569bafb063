//! `tracing` as the logging backend.
//!
//! Records the governor lets through are re-emitted as `tracing` events under
//! the `log_governor` target, with the originating logger, marker and error
//! attached as fields. Placeholders in the template are filled in here, on
//! the backend side, so the gate never formats anything.

use crate::application::ports::LogBackend;
use crate::domain::identity::{LoggerIdentity, Marker, GOVERNOR_TARGET};
use crate::domain::record::{Level, LogRecord};
use std::fmt::{self, Write};

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

/// Fill each `{}` in `template` with the next argument.
///
/// Placeholders without a matching argument are left as `{}`; surplus
/// arguments are ignored.
pub fn render(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            // Writing to a String cannot fail.
            Some(arg) => {
                let _ = write!(out, "{}", arg);
            }
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

// `tracing` needs the level at the call site, so dispatch once per level.
macro_rules! dispatch {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            Level::Trace => tracing::event!(target: GOVERNOR_TARGET, tracing::Level::TRACE, $($fields)+),
            Level::Debug => tracing::event!(target: GOVERNOR_TARGET, tracing::Level::DEBUG, $($fields)+),
            Level::Info => tracing::event!(target: GOVERNOR_TARGET, tracing::Level::INFO, $($fields)+),
            Level::Warn => tracing::event!(target: GOVERNOR_TARGET, tracing::Level::WARN, $($fields)+),
            Level::Error => tracing::event!(target: GOVERNOR_TARGET, tracing::Level::ERROR, $($fields)+),
        }
    };
}

/// Forwards records to the current `tracing` dispatcher.
///
/// Level checks go to the active subscriber through `tracing::enabled!`.
/// Markers have no `tracing` equivalent and are carried as a field.
///
/// Every record is emitted under the `log_governor` target, whatever logger
/// it came from, and enablement is checked for that target only. Target
/// directives for an application module (e.g. `EnvFilter` with
/// `my_app::db=warn`) therefore do not affect forwarded records; filter on
/// `log_governor` or on the `logger` field instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend;

impl TracingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl LogBackend for TracingBackend {
    fn is_enabled(
        &self,
        _identity: &LoggerIdentity,
        level: Level,
        _marker: Option<&Marker>,
    ) -> bool {
        match level {
            Level::Trace => tracing::enabled!(target: GOVERNOR_TARGET, tracing::Level::TRACE),
            Level::Debug => tracing::enabled!(target: GOVERNOR_TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: GOVERNOR_TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: GOVERNOR_TARGET, tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: GOVERNOR_TARGET, tracing::Level::ERROR),
        }
    }

    fn forward(&self, identity: &LoggerIdentity, record: &LogRecord<'_>) {
        let message = render(record.template(), record.args());
        let marker = record.marker().map(Marker::name);
        let error = record.attached_error().map(tracing::field::display);

        dispatch!(
            record.level(),
            logger = identity.as_str(),
            marker,
            error,
            "{}",
            message
        );
    }
}
