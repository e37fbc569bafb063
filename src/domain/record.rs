//! Log records as seen by the gate.
//!
//! A `LogRecord` carries the exact shape of one caller's log call: level,
//! optional marker, message template, arguments and an optional attached
//! error. The gate only inspects the level; everything else is forwarded to
//! the backend untouched.

use crate::domain::identity::Marker;
use std::error::Error;
use std::fmt;

/// Severity of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 5] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    /// Which counter and limit this level is charged against.
    pub fn class(self) -> MessageClass {
        match self {
            Level::Error => MessageClass::Critical,
            _ => MessageClass::NonCritical,
        }
    }

    /// Upper-case name, e.g. `"WARN"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget class of a log call.
///
/// Error-level calls are critical and have their own fixed limit. Everything
/// below error is non-critical and subject to the adjustable limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    Critical,
    NonCritical,
}

/// One log call, borrowed from the caller for the duration of `emit`.
///
/// # Example
/// ```
/// use log_governor::{Level, LogRecord, Marker};
///
/// let marker = Marker::new("AUDIT");
/// let user = "alice";
/// let args: [&dyn std::fmt::Display; 1] = [&user];
/// let record = LogRecord::new(Level::Info, "login by {}")
///     .with_marker(&marker)
///     .with_args(&args);
///
/// assert_eq!(record.level(), Level::Info);
/// assert_eq!(record.args().len(), 1);
/// ```
#[derive(Clone, Copy)]
pub struct LogRecord<'a> {
    level: Level,
    marker: Option<&'a Marker>,
    template: &'a str,
    args: &'a [&'a dyn fmt::Display],
    error: Option<&'a (dyn Error + 'static)>,
}

impl<'a> LogRecord<'a> {
    /// Create a record with no marker, arguments or error.
    pub fn new(level: Level, template: &'a str) -> Self {
        Self {
            level,
            marker: None,
            template,
            args: &[],
            error: None,
        }
    }

    pub fn trace(template: &'a str) -> Self {
        Self::new(Level::Trace, template)
    }

    pub fn debug(template: &'a str) -> Self {
        Self::new(Level::Debug, template)
    }

    pub fn info(template: &'a str) -> Self {
        Self::new(Level::Info, template)
    }

    pub fn warn(template: &'a str) -> Self {
        Self::new(Level::Warn, template)
    }

    pub fn error(template: &'a str) -> Self {
        Self::new(Level::Error, template)
    }

    /// Attach a marker.
    pub fn with_marker(mut self, marker: &'a Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Attach template arguments.
    pub fn with_args(mut self, args: &'a [&'a dyn fmt::Display]) -> Self {
        self.args = args;
        self
    }

    /// Attach an error.
    pub fn with_error(mut self, error: &'a (dyn Error + 'static)) -> Self {
        self.error = Some(error);
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn class(&self) -> MessageClass {
        self.level.class()
    }

    pub fn marker(&self) -> Option<&'a Marker> {
        self.marker
    }

    pub fn template(&self) -> &'a str {
        self.template
    }

    pub fn args(&self) -> &'a [&'a dyn fmt::Display] {
        self.args
    }

    pub fn attached_error(&self) -> Option<&'a (dyn Error + 'static)> {
        self.error
    }
}

impl fmt::Debug for LogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        f.debug_struct("LogRecord")
            .field("level", &self.level)
            .field("marker", &self.marker)
            .field("template", &self.template)
            .field("args", &args)
            .field("error", &self.error.map(|e| e.to_string()))
            .finish()
    }
}
