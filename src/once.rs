//! Run-once wrappers.
//!
//! [`Once`] runs its function on the first call and hands the cached result
//! to every later call, ignoring their arguments. [`OnceAsync`] does the same
//! with a shared future handle; a failed future stays cached.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::OnceLock;

use futures::future::{BoxFuture, FutureExt, Shared};

/// A function that runs at most once.
pub struct Once<A, R, F> {
    func: F,
    result: OnceLock<R>,
    _args: PhantomData<fn(A)>,
}

impl<A, R, F> Once<A, R, F>
where
    F: Fn(A) -> R,
    R: Clone,
{
    /// Runs the function on the first call; returns the cached result after.
    ///
    /// If the function panics nothing is cached and the next call runs it again.
    pub fn call(&self, args: A) -> R {
        self.result.get_or_init(|| (self.func)(args)).clone()
    }
}

impl<A, R, F> Once<A, R, F> {
    /// The cached result, if the function already ran.
    pub fn get(&self) -> Option<&R> {
        self.result.get()
    }

    pub fn is_called(&self) -> bool {
        self.result.get().is_some()
    }
}

impl<A, R: fmt::Debug, F> fmt::Debug for Once<A, R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Once").field("result", &self.result.get()).finish()
    }
}

/// Wraps `func` so that it runs at most once.
///
/// ```
/// use callkit::once::once;
///
/// let init = once(|name: &str| format!("configured for {name}"));
/// assert_eq!(init.call("prod"), "configured for prod");
/// assert_eq!(init.call("staging"), "configured for prod");
/// ```
pub fn once<A, R, F>(func: F) -> Once<A, R, F>
where
    F: Fn(A) -> R,
    R: Clone,
{
    Once {
        func,
        result: OnceLock::new(),
        _args: PhantomData,
    }
}

/// A future-returning function that starts at most one computation.
pub struct OnceAsync<A, T, F> {
    func: F,
    handle: OnceLock<Shared<BoxFuture<'static, T>>>,
    _args: PhantomData<fn(A)>,
}

impl<A, T, F> OnceAsync<A, T, F> {
    /// Starts the computation on the first call; returns the same shared
    /// handle on every call.
    pub fn call<Fut>(&self, args: A) -> Shared<BoxFuture<'static, T>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Clone + 'static,
    {
        self.handle
            .get_or_init(|| (self.func)(args).boxed().shared())
            .clone()
    }

    pub fn is_called(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl<A, T, F> fmt::Debug for OnceAsync<A, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceAsync")
            .field("called", &self.handle.get().is_some())
            .finish()
    }
}

/// Wraps the future-returning `func` so that it starts at most once.
pub fn once_async<A, T, F>(func: F) -> OnceAsync<A, T, F> {
    OnceAsync {
        func,
        handle: OnceLock::new(),
        _args: PhantomData,
    }
}
