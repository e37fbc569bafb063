//! Storage implementations for the logger registry.
//!
//! Provides concurrent, sharded storage keyed by logger identity.

use crate::application::ports::Storage;
use ahash::RandomState;
use dashmap::DashMap;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

/// Thread-safe sharded storage backed by DashMap.
///
/// DashMap provides lock-free reads and fine-grained locking for writes,
/// which keeps lookups on the logging hot path cheap. Keys are hashed with
/// ahash.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    map: DashMap<K, V, RandomState>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    /// Create a new sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Check if a key exists.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Clone + Send + Sync + Debug,
{
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    fn get_or_insert_with(&self, key: K, factory: impl FnOnce() -> V) -> V {
        // The shard write lock is held across the factory, so racing callers
        // wait and then see the winner's value.
        self.map.entry(key).or_insert_with(factory).value().clone()
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for entry in self.map.iter() {
            f(entry.key(), entry.value());
        }
    }
}
