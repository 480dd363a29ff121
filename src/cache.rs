//! # Bounded LRU cache
//!
//! Key → value store with an explicit recency order and an optional size
//! bound. Backs both memoizers.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                       BoundedCache<K, V>                          │
//!   │                                                                   │
//!   │   FxHashMap<K, Slot<V>>              RecencyList<K>               │
//!   │   ┌───────┬──────────────────┐                                    │
//!   │   │  key  │ value │ node     │       lru                  mru     │
//!   │   ├───────┼───────┼──────────┤        │                    │      │
//!   │   │  "a"  │  ...  │  id_0 ───┼──────► [a] ◄──► [b] ◄──► [c]       │
//!   │   │  "b"  │  ...  │  id_1 ───┼─────────────────┘         ▲        │
//!   │   │  "c"  │  ...  │  id_2 ───┼───────────────────────────┘        │
//!   │   └───────┴───────┴──────────┘                                    │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//!
//! | `max_size` | `get` refreshes recency | `insert` may evict |
//! |------------|-------------------------|--------------------|
//! | `0`        | no                      | no                 |
//! | `n > 0`    | yes                     | yes, down to `n`   |
//!
//! Eviction removes exactly one least-recently-used entry per entry over
//! the bound, oldest first. Entries that were never read keep their
//! insertion order, so ties resolve to the earliest insertion.
//!
//! ## Example
//!
//! ```
//! use callkit::cache::BoundedCache;
//!
//! let mut cache = BoundedCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a"); // "a" is now more recent than "b"
//! cache.insert("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.len(), 2);
//! ```

use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashMap;

use crate::ds::arena::NodeId;
use crate::ds::recency_list::RecencyList;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CacheMetricsReadRecorder, CacheMetricsRecorder, MetricsReset, MetricsSnapshotProvider,
};

#[derive(Debug)]
struct Slot<V> {
    value: V,
    node: NodeId,
}

/// Hash map plus intrusive recency list with an LRU size bound.
///
/// Not synchronized; the memoizers wrap it in a `parking_lot::Mutex`.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    map: FxHashMap<K, Slot<V>>,
    order: RecencyList<K>,
    max_size: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `max_size` entries; `0` means unbounded.
    pub fn new(max_size: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(max_size, Default::default()),
            order: RecencyList::with_capacity(max_size),
            max_size,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Creates a cache that never evicts.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.max_size > 0
    }

    /// Returns `true` if `key` is cached. Does not touch recency.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Looks up `key`, marking it most recently used when the cache is bounded.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(slot) = self.map.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        if self.max_size > 0 {
            self.order.touch(slot.node);
        }
        Some(&slot.value)
    }

    /// Looks up `key` without affecting recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        let value = self.map.get(key).map(|slot| &slot.value);

        #[cfg(feature = "metrics")]
        {
            if value.is_some() {
                (&self.metrics).record_peek_found();
            }
        }
        value
    }

    /// Inserts or replaces the value for `key`, returning the previous value.
    ///
    /// A new entry becomes the most recent one; when bounded, so does a
    /// replaced one. Least recently used entries are evicted until the
    /// cache fits its bound again.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.map.get_mut(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            if self.max_size > 0 {
                self.order.touch(slot.node);
            }
            return Some(mem::replace(&mut slot.value, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let node = self.order.push_mru(key.clone());
        self.map.insert(key, Slot { value, node });
        self.shrink_to_bound();
        None
    }

    /// Removes `key`, returning its value if it was cached.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.map.remove(key)?;
        self.order.remove(slot.node);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();

        Some(slot.value)
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.map.clear();
        self.order.clear();
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.map.get(key).map(|slot| (key, &slot.value)))
    }

    /// Iterates keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.iter()
    }

    fn shrink_to_bound(&mut self) {
        if self.max_size == 0 {
            return;
        }
        while self.map.len() > self.max_size {
            let Some(key) = self.order.pop_lru() else {
                break;
            };
            self.map.remove(&key);
            tracing::trace!(len = self.map.len(), max_size = self.max_size, "evicted lru entry");

            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }
    }

    /// Verifies that the index, the recency list and the bound agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.order.check_invariants()?;

        if self.order.len() != self.map.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list holds {}",
                self.map.len(),
                self.order.len()
            )));
        }
        if self.max_size > 0 && self.map.len() > self.max_size {
            return Err(InvariantError::new(format!(
                "cache holds {} entries over a bound of {}",
                self.map.len(),
                self.max_size
            )));
        }
        for (key, slot) in &self.map {
            if self.order.get(slot.node) != Some(key) {
                return Err(InvariantError::new("index points at a foreign recency node"));
            }
        }
        Ok(())
    }
}

impl<K, V> Default for BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            get_calls: self.metrics.get_calls.get(),
            get_hits: self.metrics.get_hits.get(),
            get_misses: self.metrics.get_misses.get(),
            insert_new: self.metrics.insert_new.get(),
            insert_updates: self.metrics.insert_updates.get(),
            evicted_entries: self.metrics.evicted_entries.get(),
            removals: self.metrics.removals.get(),
            clears: self.metrics.clears.get(),
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            cache_len: self.map.len(),
            max_size: self.max_size,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsReset for BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Zeroes every counter; entries are untouched.
    fn reset_metrics(&self) {
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}
