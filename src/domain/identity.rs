//! Logger identities and markers.
//!
//! A `LoggerIdentity` names one logical log source. It is the registry key,
//! so two equal identities always resolve to the same gated logger.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Target and identity under which the governor reports on itself.
pub const GOVERNOR_TARGET: &str = "log_governor";

/// Opaque key identifying a logical log source.
///
/// Identities are either free-form names (`"payments::ledger"`) or derived
/// from a Rust type via [`LoggerIdentity::of`]. Ordering follows the textual
/// form, which is what the sweep uses to break ranking ties.
///
/// # Example
/// ```
/// use log_governor::LoggerIdentity;
///
/// struct Ledger;
///
/// let by_name = LoggerIdentity::named("payments");
/// let by_type = LoggerIdentity::of::<Ledger>();
///
/// assert_eq!(by_name.as_str(), "payments");
/// assert!(by_type.as_str().ends_with("Ledger"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoggerIdentity(Cow<'static, str>);

impl LoggerIdentity {
    /// Create an identity from a name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Create an identity from a type's fully qualified path.
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Identity used for the governor's own notices.
    pub fn governor() -> Self {
        Self(Cow::Borrowed(GOVERNOR_TARGET))
    }

    /// The textual form of this identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hash as `str` so the registry can be probed with a borrowed target.
impl Hash for LoggerIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for LoggerIdentity {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for LoggerIdentity {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for LoggerIdentity {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl fmt::Display for LoggerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named tag attached to a log call, forwarded untouched to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Marker(Cow<'static, str>);

impl Marker {
    /// Create a marker with the given name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The marker's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
