//! Synchronous memoization.
//!
//! `call` looks the resolved key up in the cache; a hit returns the stored
//! value (refreshing its recency when the cache is bounded), a miss runs the
//! function and stores its result. The cache lock is released while the
//! function runs, so the function may consult the cache, or its own
//! wrapper, without deadlocking.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::memo::{IdentityKey, SharedCache, shared_cache};
use crate::options::MemoizeOptions;

/// A memoized function.
pub struct Memoized<A, K, V, F, R = IdentityKey<A>> {
    func: F,
    resolver: R,
    cache: SharedCache<K, V>,
    _args: PhantomData<fn(A)>,
}

impl<A, K, V, F, R> Memoized<A, K, V, F, R>
where
    K: Eq + Hash + Clone,
    R: Fn(&A) -> K,
{
    /// Builds a wrapper over an existing, possibly shared, cache.
    pub fn with_cache(func: F, resolver: R, cache: SharedCache<K, V>) -> Self {
        Self {
            func,
            resolver,
            cache,
            _args: PhantomData,
        }
    }

    /// Calls the function, or returns the value cached for the resolved key.
    pub fn call(&self, args: A) -> V
    where
        F: Fn(A) -> V,
        V: Clone,
    {
        let key = (self.resolver)(&args);
        if let Some(hit) = self.cache.lock().get(&key) {
            return hit.clone();
        }
        let value = (self.func)(args);
        self.cache.lock().insert(key, value.clone());
        value
    }

    /// Like [`call`](Self::call) for fallible functions: only `Ok` values
    /// are cached, and an `Err` is returned as is so the next call retries.
    pub fn try_call<E>(&self, args: A) -> Result<V, E>
    where
        F: Fn(A) -> Result<V, E>,
        V: Clone,
    {
        let key = (self.resolver)(&args);
        if let Some(hit) = self.cache.lock().get(&key) {
            return Ok(hit.clone());
        }
        let value = (self.func)(args)?;
        self.cache.lock().insert(key, value.clone());
        Ok(value)
    }

    /// The underlying cache.
    pub fn cache(&self) -> &SharedCache<K, V> {
        &self.cache
    }

    /// Removes every cached value.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Removes the value cached for `key`. Returns whether one was present.
    pub fn delete(&self, key: &K) -> bool {
        self.cache.lock().remove(key).is_some()
    }
}

impl<A, K, V, F, R> fmt::Debug for Memoized<A, K, V, F, R>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("Memoized")
            .field("len", &cache.len())
            .field("max_size", &cache.max_size())
            .finish()
    }
}

/// Memoizes `func`, keyed by its whole argument.
///
/// # Example
///
/// ```
/// use callkit::memo::memoize;
/// use callkit::options::MemoizeOptions;
///
/// let square = memoize(|n: u64| n * n, MemoizeOptions::default().max_size(128));
/// assert_eq!(square.call(12), 144);
/// assert!(square.cache().lock().contains(&12));
/// ```
pub fn memoize<A, V, F>(func: F, options: MemoizeOptions) -> Memoized<A, A, V, F>
where
    A: Eq + Hash + Clone,
{
    memoize_with(func, A::clone as IdentityKey<A>, options)
}

/// Memoizes `func`, keyed by `resolver(&args)`.
pub fn memoize_with<A, K, V, F, R>(
    func: F,
    resolver: R,
    options: MemoizeOptions,
) -> Memoized<A, K, V, F, R>
where
    K: Eq + Hash + Clone,
    R: Fn(&A) -> K,
{
    Memoized::with_cache(func, resolver, shared_cache(options.max_size))
}
