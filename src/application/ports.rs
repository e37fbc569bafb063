//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::identity::{LoggerIdentity, Marker};
use crate::domain::record::{Level, LogRecord};
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

/// Port for the logging backend the governor sits in front of.
///
/// The backend owns formatting, transport and sinks. The governor only asks
/// whether a level is enabled and forwards records it lets through, exactly
/// as the caller shaped them. The governor's own notices (suppression counts,
/// limit reductions) are sent through `forward` as well, at info level, and
/// are never counted against any logger.
///
/// Failures inside the backend are the backend's business: the governor does
/// not catch, retry or buffer anything.
pub trait LogBackend: Send + Sync + Debug {
    /// Whether a call at `level` with `marker` would be recorded for `identity`.
    fn is_enabled(&self, identity: &LoggerIdentity, level: Level, marker: Option<&Marker>)
        -> bool;

    /// Deliver a record on behalf of `identity`.
    fn forward(&self, identity: &LoggerIdentity, record: &LogRecord<'_>);
}

/// Port for the concurrent, append-only map behind the logger registry.
///
/// This abstraction allows the application layer to store and retrieve values
/// without depending on specific concurrent data structure implementations.
/// Infrastructure provides concrete implementations (ShardedStorage).
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Look up a value without creating it.
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Return the value for `key`, creating it with `factory` if absent.
    ///
    /// Concurrent callers racing on the same absent key must all observe the
    /// single value that won; `factory` runs at most once per key.
    fn get_or_insert_with(&self, key: K, factory: impl FnOnce() -> V) -> V;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Iterate over all entries, providing access to both key and value.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);
}
