//! Throttling as a special case of debouncing.
//!
//! A throttled function invokes at most once per `wait`: it is a debounce
//! whose `max_wait` equals `wait`, with the leading edge enabled by default.

use crate::options::{Millis, ThrottleOptions};
use crate::rate::debounce::{Debounced, Policy};
use crate::time::scheduler::Scheduler;

/// A throttled function. Same controller and operations as [`Debounced`].
pub type Throttled<A, R, F, S> = Debounced<A, R, F, S>;

impl Policy {
    pub(crate) fn throttle(wait: Millis, options: ThrottleOptions) -> Self {
        Self {
            wait: wait.get(),
            leading: options.leading,
            trailing: options.trailing,
            max_wait: Some(wait.get()),
        }
    }
}

/// Throttles `func` to at most one invocation per `wait`.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use callkit::options::ThrottleOptions;
/// use callkit::rate::throttle;
/// use callkit::time::ManualScheduler;
///
/// let sched = Rc::new(ManualScheduler::new());
/// let hits = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&hits);
/// let on_scroll = throttle(
///     move |_: ()| counter.set(counter.get() + 1),
///     100,
///     ThrottleOptions::default(),
///     Rc::clone(&sched),
/// );
///
/// for _ in 0..5 {
///     on_scroll.call(());
///     sched.advance(10);
/// }
/// assert_eq!(hits.get(), 1);
/// sched.advance(100);
/// assert_eq!(hits.get(), 2);
/// ```
pub fn throttle<A, R, F, S>(
    func: F,
    wait: impl Into<Millis>,
    options: ThrottleOptions,
    scheduler: S,
) -> Throttled<A, R, F, S>
where
    A: 'static,
    R: Clone + 'static,
    F: Fn(A) -> R + 'static,
    S: Scheduler + 'static,
{
    Debounced::with_policy(func, Policy::throttle(wait.into(), options), scheduler)
}
