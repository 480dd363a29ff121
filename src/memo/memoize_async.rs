//! Asynchronous memoization with in-flight deduplication.
//!
//! The cache stores a shared handle to the computation, inserted before it
//! settles, so every caller that resolves to the same key while the entry
//! exists awaits the very same computation.
//!
//! ```text
//!   call(k) ──► cache hit? ──yes──► clone of the stored handle
//!                  │
//!                  no
//!                  ▼
//!   func(args) ─► wrap: await, on Err evict k if the entry is still ours
//!                  │
//!                  ▼
//!   .boxed().shared() ──► insert InFlight { handle, identity } ──► handle
//! ```
//!
//! A failed computation removes its own entry, but only while the entry
//! still carries the identity it was inserted with; an entry replaced after a
//! `delete`, `clear`, or eviction is left alone. Successful entries stay
//! until evicted or deleted.
//!
//! Futures are lazy: the eviction check runs when some holder drives the
//! handle to completion. Do not poll a handle while holding the cache lock.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::cache::BoundedCache;
use crate::memo::{IdentityKey, SharedCache, shared_cache};
use crate::options::MemoizeOptions;

/// Shared, cloneable handle to a memoized computation.
pub type SharedResult<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Cache entry of an [`AsyncMemoized`]: the shared handle plus an
/// allocation identifying this particular insertion.
pub struct InFlight<T, E> {
    handle: SharedResult<T, E>,
    identity: Arc<()>,
}

impl<T, E> InFlight<T, E> {
    fn same_insertion(&self, identity: &Arc<()>) -> bool {
        Arc::ptr_eq(&self.identity, identity)
    }

    pub fn handle(&self) -> &SharedResult<T, E> {
        &self.handle
    }

    /// Returns `true` once the computation has settled.
    pub fn is_settled(&self) -> bool {
        self.handle.peek().is_some()
    }
}

impl<T, E> Clone for InFlight<T, E> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<T, E> fmt::Debug for InFlight<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("settled", &self.handle.peek().is_some())
            .finish()
    }
}

type EntryCache<K, T, E> = BoundedCache<K, InFlight<T, E>>;

fn evict_failed<K, T, E>(cache: &Weak<Mutex<EntryCache<K, T, E>>>, key: &K, identity: &Arc<()>)
where
    K: Eq + Hash + Clone,
{
    let Some(cache) = cache.upgrade() else {
        return;
    };
    let mut cache = cache.lock();
    if cache.peek(key).is_some_and(|entry| entry.same_insertion(identity)) {
        cache.remove(key);
        tracing::debug!("failed computation evicted from async memo cache");
    }
}

/// A memoized future-returning function.
pub struct AsyncMemoized<A, K, T, E, F, R = IdentityKey<A>> {
    func: F,
    resolver: R,
    cache: SharedCache<K, InFlight<T, E>>,
    _args: PhantomData<fn(A)>,
}

impl<A, K, T, E, F, R> AsyncMemoized<A, K, T, E, F, R>
where
    K: Eq + Hash + Clone,
    R: Fn(&A) -> K,
{
    /// Builds a wrapper over an existing, possibly shared, cache.
    pub fn with_cache(func: F, resolver: R, cache: SharedCache<K, InFlight<T, E>>) -> Self {
        Self {
            func,
            resolver,
            cache,
            _args: PhantomData,
        }
    }

    /// Returns the handle cached for the resolved key, or starts the
    /// computation and caches its handle before it settles.
    pub fn call<Fut>(&self, args: A) -> SharedResult<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        K: Send + 'static,
        T: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        let key = (self.resolver)(&args);
        if let Some(entry) = self.cache.lock().get(&key) {
            return entry.handle.clone();
        }

        let identity = Arc::new(());
        let own = Arc::clone(&identity);
        let computation = (self.func)(args);
        let weak = Arc::downgrade(&self.cache);
        let observed = key.clone();
        let handle = async move {
            let result = computation.await;
            if result.is_err() {
                evict_failed(&weak, &observed, &own);
            }
            result
        }
        .boxed()
        .shared();

        let mut cache = self.cache.lock();
        // Another caller may have filled the key while `func` ran.
        if let Some(entry) = cache.get(&key) {
            return entry.handle.clone();
        }
        cache.insert(
            key,
            InFlight {
                handle: handle.clone(),
                identity,
            },
        );
        handle
    }

    /// The underlying cache.
    pub fn cache(&self) -> &SharedCache<K, InFlight<T, E>> {
        &self.cache
    }

    /// Removes every cached handle. Computations already handed out keep running.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Removes the handle cached for `key`. Returns whether one was present.
    pub fn delete(&self, key: &K) -> bool {
        self.cache.lock().remove(key).is_some()
    }
}

impl<A, K, T, E, F, R> fmt::Debug for AsyncMemoized<A, K, T, E, F, R>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("AsyncMemoized")
            .field("len", &cache.len())
            .field("max_size", &cache.max_size())
            .finish()
    }
}

/// Memoizes the future-returning `func`, keyed by its whole argument.
///
/// # Example
///
/// ```
/// use callkit::memo::memoize_async;
/// use callkit::options::MemoizeOptions;
/// use futures::executor::block_on;
/// use futures::future;
///
/// let lookup = memoize_async(
///     |id: u32| future::ready(Ok::<_, String>(format!("user-{id}"))),
///     MemoizeOptions::default(),
/// );
/// let first = lookup.call(7);
/// let again = lookup.call(7);
/// assert_eq!(block_on(first), Ok("user-7".to_string()));
/// assert_eq!(block_on(again), Ok("user-7".to_string()));
/// ```
pub fn memoize_async<A, T, E, F>(func: F, options: MemoizeOptions) -> AsyncMemoized<A, A, T, E, F>
where
    A: Eq + Hash + Clone,
{
    memoize_async_with(func, A::clone as IdentityKey<A>, options)
}

/// Memoizes the future-returning `func`, keyed by `resolver(&args)`.
pub fn memoize_async_with<A, K, T, E, F, R>(
    func: F,
    resolver: R,
    options: MemoizeOptions,
) -> AsyncMemoized<A, K, T, E, F, R>
where
    K: Eq + Hash + Clone,
    R: Fn(&A) -> K,
{
    AsyncMemoized::with_cache(func, resolver, shared_cache(options.max_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Reply = Result<u32, String>;

    /// Memoizer whose computations settle only when the test answers them.
    struct Harness {
        calls: Arc<AtomicUsize>,
        pending: Arc<Mutex<Vec<oneshot::Sender<Reply>>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                pending: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn func(&self) -> impl Fn(u32) -> BoxFuture<'static, Reply> + use<> {
            let calls = Arc::clone(&self.calls);
            let pending = Arc::clone(&self.pending);
            move |_key: u32| {
                calls.fetch_add(1, Ordering::SeqCst);
                let (tx, rx) = oneshot::channel();
                pending.lock().push(tx);
                async move { rx.await.unwrap_or_else(|_| Err("dropped".to_string())) }.boxed()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self, index: usize, reply: Reply) {
            let tx = self.pending.lock().remove(index);
            assert!(tx.send(reply).is_ok());
        }
    }

    #[test]
    fn concurrent_calls_share_one_computation() {
        let h = Harness::new();
        let m = memoize_async(h.func(), MemoizeOptions::default());
        let first = m.call(1);
        let second = m.call(1);
        assert!(Shared::ptr_eq(&first, &second));
        assert_eq!(h.calls(), 1);

        h.answer(0, Ok(42));
        assert_eq!(block_on(first), Ok(42));
        assert_eq!(block_on(second), Ok(42));
    }

    #[test]
    fn success_stays_cached() {
        let h = Harness::new();
        let m = memoize_async(h.func(), MemoizeOptions::default());
        let first = m.call(3);
        h.answer(0, Ok(9));
        assert_eq!(block_on(first.clone()), Ok(9));

        let later = m.call(3);
        assert!(Shared::ptr_eq(&first, &later));
        assert!(m.cache().lock().peek(&3).is_some_and(InFlight::is_settled));
        assert_eq!(h.calls(), 1);
    }

    #[test]
    fn failure_evicts_entry_and_next_call_retries() {
        let h = Harness::new();
        let m = memoize_async(h.func(), MemoizeOptions::default());
        let first = m.call(5);
        h.answer(0, Err("boom".to_string()));
        assert_eq!(block_on(first), Err("boom".to_string()));
        assert!(!m.cache().lock().contains(&5));

        let retry = m.call(5);
        assert_eq!(h.calls(), 2);
        h.answer(0, Ok(1));
        assert_eq!(block_on(retry), Ok(1));
        assert!(m.cache().lock().contains(&5));
    }

    #[test]
    fn stale_failure_leaves_replacement_entry_alone() {
        let h = Harness::new();
        let m = memoize_async(h.func(), MemoizeOptions::default());
        let stale = m.call(8);
        assert!(m.delete(&8));
        let fresh = m.call(8);
        assert!(!Shared::ptr_eq(&stale, &fresh));
        assert_eq!(h.calls(), 2);

        h.answer(0, Err("late".to_string()));
        assert!(block_on(stale).is_err());
        let entry = m.cache().lock().peek(&8).cloned();
        assert!(entry.is_some_and(|e| Shared::ptr_eq(e.handle(), &fresh)));
    }

    #[test]
    fn failure_leaves_entry_of_sibling_wrapper_alone() {
        let h = Harness::new();
        let cache = shared_cache(0);
        let key = u32::clone as IdentityKey<u32>;
        let first = AsyncMemoized::with_cache(h.func(), key, Arc::clone(&cache));
        let second = AsyncMemoized::with_cache(h.func(), key, Arc::clone(&cache));

        let stale = first.call(6);
        assert!(first.delete(&6));
        let fresh = second.call(6);
        assert_eq!(h.calls(), 2);

        h.answer(0, Err("late".to_string()));
        assert!(block_on(stale).is_err());
        let entry = second.cache().lock().peek(&6).cloned();
        assert!(entry.is_some_and(|e| Shared::ptr_eq(e.handle(), &fresh)));

        h.answer(0, Err("fresh".to_string()));
        assert!(block_on(fresh).is_err());
        assert!(cache.lock().is_empty());
    }

    #[test]
    fn failure_after_clear_is_harmless() {
        let h = Harness::new();
        let m = memoize_async(h.func(), MemoizeOptions::default());
        let handle = m.call(2);
        m.clear();
        h.answer(0, Err("x".to_string()));
        assert!(block_on(handle).is_err());
        assert!(m.cache().lock().is_empty());
    }

    #[test]
    fn failure_after_cache_dropped_is_harmless() {
        let h = Harness::new();
        let m = memoize_async(h.func(), MemoizeOptions::default());
        let handle = m.call(2);
        drop(m);
        h.answer(0, Err("x".to_string()));
        assert!(block_on(handle).is_err());
    }

    #[test]
    fn bounded_async_cache_evicts_lru_handles() {
        let m = memoize_async(
            |n: u32| future::ready(Ok::<u32, ()>(n)),
            MemoizeOptions::default().max_size(2),
        );
        let a = m.call(1);
        m.call(2);
        let a_again = m.call(1);
        assert!(Shared::ptr_eq(&a, &a_again));
        m.call(3);

        let cache = m.cache().lock();
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn resolver_groups_arguments() {
        let m = memoize_async_with(
            |(id, _attempt): (u32, u32)| future::ready(Ok::<u32, ()>(id * 10)),
            |args: &(u32, u32)| args.0,
            MemoizeOptions::default(),
        );
        let a = m.call((4, 0));
        let b = m.call((4, 1));
        assert!(Shared::ptr_eq(&a, &b));
        assert_eq!(block_on(b), Ok(40));
    }
}
