//! Memoizing wrappers over a [`BoundedCache`].
//!
//! Each wrapper owns an [`Arc`]-shared, mutex-guarded cache. Two wrappers
//! share a cache only when built over the same [`SharedCache`] through
//! their `with_cache` constructors.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::BoundedCache;

pub mod memoize;
pub mod memoize_async;

pub use memoize::{Memoized, memoize, memoize_with};
pub use memoize_async::{
    AsyncMemoized, InFlight, SharedResult, memoize_async, memoize_async_with,
};

/// Cache handle held by memoizers.
pub type SharedCache<K, V> = Arc<Mutex<BoundedCache<K, V>>>;

/// Default key resolver: the argument itself.
pub type IdentityKey<A> = fn(&A) -> A;

/// Creates a cache that can be handed to several memoizers.
pub fn shared_cache<K, V>(max_size: usize) -> SharedCache<K, V>
where
    K: Eq + std::hash::Hash + Clone,
{
    Arc::new(Mutex::new(BoundedCache::new(max_size)))
}
