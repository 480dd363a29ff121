//! # Debounce controller
//!
//! Wraps a function so that bursts of calls collapse into at most one
//! leading and one trailing invocation, optionally with a `max_wait`
//! ceiling that forces an invocation during an unbroken burst.
//!
//! ## State
//!
//! ```text
//!   ┌──────────────────────────── Controller ────────────────────────────┐
//!   │  func: F                   wait / leading / trailing / max_wait    │
//!   │  scheduler: S                                                      │
//!   │  state: RefCell<CycleState>                                        │
//!   │     ├─ args         latest call's arguments (what eventually fires)│
//!   │     ├─ last_call    None until the first call of a cycle           │
//!   │     ├─ last_invoke  time of the last real invocation               │
//!   │     ├─ result       last value returned by `func`                  │
//!   │     └─ timer        at most one pending TimerHandle                │
//!   └────────────────────────────────────────────────────────────────────┘
//!          ▲                                   │
//!          │ Weak                              │ schedule / cancel
//!          └──────── timer callback ◄──────────┘
//! ```
//!
//! ## Call flow
//!
//! ```text
//!   call(args) at t
//!     should = first call | t - last_call >= wait | clock went back
//!              | t - last_invoke >= max_wait
//!     record args, last_call = t
//!     no timer:  leading && should  → invoke now (+ arm wait if trailing)
//!                trailing           → arm wait
//!                otherwise          → drop args
//!     timer and max_wait && should → (re-arm wait if trailing) invoke now
//!     otherwise                    → cached result
//!
//!   timer fires at t
//!     should → invoke if trailing, done
//!     else   → re-arm for min(wait - since_call, max_wait - since_invoke)
//! ```
//!
//! The controller is single-threaded: it shares itself with its timers
//! through `Rc`/`Weak`. The wrapped function is `Fn` and no `RefCell`
//! borrow is held while it runs, so it may call back into its own wrapper,
//! including recursively through a leading or `max_wait` invocation.
//! Functions that need mutable state keep it behind their own `Cell` or
//! `RefCell`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::RateMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::RateMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider, RateMetricsRecorder};
use crate::options::{DebounceOptions, Millis};
use crate::time::scheduler::{Scheduler, TimerHandle};

/// Normalized controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Policy {
    pub(crate) wait: u64,
    pub(crate) leading: bool,
    pub(crate) trailing: bool,
    pub(crate) max_wait: Option<u64>,
}

impl Policy {
    pub(crate) fn debounce(wait: Millis, options: DebounceOptions) -> Self {
        Self {
            wait: wait.get(),
            leading: options.leading,
            trailing: options.trailing,
            max_wait: options.max_wait.map(Millis::get),
        }
    }
}

struct CycleState<A, R> {
    args: Option<A>,
    last_call: Option<u64>,
    last_invoke: u64,
    result: Option<R>,
    timer: Option<TimerHandle>,
}

impl<A, R> CycleState<A, R> {
    fn new() -> Self {
        Self {
            args: None,
            last_call: None,
            last_invoke: 0,
            result: None,
            timer: None,
        }
    }
}

#[inline]
fn elapsed(since: u64, now: u64) -> i128 {
    i128::from(now) - i128::from(since)
}

struct Controller<A, R, F, S>
where
    S: Scheduler,
{
    func: F,
    scheduler: S,
    policy: Policy,
    state: RefCell<CycleState<A, R>>,
    #[cfg(feature = "metrics")]
    metrics: RateMetrics,
}

impl<A, R, F, S> Controller<A, R, F, S>
where
    A: 'static,
    R: Clone + 'static,
    F: Fn(A) -> R + 'static,
    S: Scheduler + 'static,
{
    fn should_invoke(&self, state: &CycleState<A, R>, now: u64) -> bool {
        let Some(last_call) = state.last_call else {
            return true;
        };
        let since_call = elapsed(last_call, now);
        let since_invoke = elapsed(state.last_invoke, now);
        since_call >= i128::from(self.policy.wait)
            || since_call < 0
            || self
                .policy
                .max_wait
                .is_some_and(|max_wait| since_invoke >= i128::from(max_wait))
    }

    fn remaining_wait(&self, state: &CycleState<A, R>, now: u64) -> u64 {
        let since_call = elapsed(state.last_call.unwrap_or(now), now);
        let waiting = i128::from(self.policy.wait) - since_call;
        let remaining = match self.policy.max_wait {
            Some(max_wait) => {
                waiting.min(i128::from(max_wait) - elapsed(state.last_invoke, now))
            },
            None => waiting,
        };
        u64::try_from(remaining.max(0)).unwrap_or(u64::MAX)
    }

    fn stop_timer(&self, state: &mut CycleState<A, R>) {
        if let Some(handle) = state.timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Arms the cycle timer, replacing any pending one.
    fn start_timer(self: &Rc<Self>, state: &mut CycleState<A, R>, delay: u64) {
        self.stop_timer(state);
        let this: Weak<Self> = Rc::downgrade(self);
        let handle = self.scheduler.schedule(
            Millis::new(delay),
            Box::new(move || {
                if let Some(controller) = this.upgrade() {
                    controller.on_timer();
                }
            }),
        );
        state.timer = Some(handle);
        tracing::trace!(delay, "debounce timer armed");

        #[cfg(feature = "metrics")]
        self.metrics.record_timer_armed();
    }

    /// Runs `func` with the recorded arguments, or returns the cached
    /// result when nothing is recorded.
    fn invoke(&self) -> Option<R> {
        let args = {
            let mut state = self.state.borrow_mut();
            match state.args.take() {
                Some(args) => {
                    state.last_invoke = self.scheduler.now();
                    args
                },
                None => return state.result.clone(),
            }
        };

        tracing::trace!("debounced function invoked");
        #[cfg(feature = "metrics")]
        self.metrics.record_invocation();

        let result = (self.func)(args);
        self.state.borrow_mut().result = Some(result.clone());
        Some(result)
    }

    fn on_timer(self: &Rc<Self>) {
        let now = self.scheduler.now();

        #[cfg(feature = "metrics")]
        self.metrics.record_timer_fired();

        let mut state = self.state.borrow_mut();
        state.timer = None;
        if self.should_invoke(&state, now) {
            drop(state);
            tracing::trace!(now, "debounce timer fired, cycle complete");
            if self.policy.trailing {
                self.invoke();
            }
            return;
        }
        let remaining = self.remaining_wait(&state, now);
        self.start_timer(&mut state, remaining);
    }

    fn call(self: &Rc<Self>, args: A) -> Option<R> {
        let now = self.scheduler.now();

        #[cfg(feature = "metrics")]
        self.metrics.record_call();

        let mut state = self.state.borrow_mut();
        let invoking = self.should_invoke(&state, now);
        state.args = Some(args);
        state.last_call = Some(now);

        if state.timer.is_none() {
            if self.policy.leading && invoking {
                drop(state);
                let result = self.invoke();
                let mut state = self.state.borrow_mut();
                if self.policy.trailing {
                    self.start_timer(&mut state, self.policy.wait);
                } else {
                    state.args = None;
                }
                return result;
            }

            if self.policy.trailing {
                self.start_timer(&mut state, self.policy.wait);
            } else {
                state.args = None;
            }
            return state.result.clone();
        }

        if self.policy.max_wait.is_some() && invoking {
            if self.policy.trailing {
                self.start_timer(&mut state, self.policy.wait);
            }
            drop(state);
            return self.invoke();
        }

        state.result.clone()
    }

    fn cancel(&self) {
        let mut state = self.state.borrow_mut();
        self.stop_timer(&mut state);
        *state = CycleState::new();
        tracing::trace!("debounce cycle canceled");

        #[cfg(feature = "metrics")]
        self.metrics.record_cancel();
    }

    fn flush(&self) -> Option<R> {
        #[cfg(feature = "metrics")]
        self.metrics.record_flush();

        let mut state = self.state.borrow_mut();
        if state.timer.is_none() {
            return state.result.clone();
        }
        self.stop_timer(&mut state);
        if !self.policy.trailing {
            return state.result.clone();
        }
        drop(state);
        tracing::trace!("debounce cycle flushed");
        self.invoke()
    }
}

impl<A, R, F, S> Drop for Controller<A, R, F, S>
where
    S: Scheduler,
{
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

/// A debounced (or throttled) function.
///
/// Cloning yields another handle to the same controller. When the last
/// handle is dropped any pending timer is canceled.
pub struct Debounced<A, R, F, S>
where
    S: Scheduler,
{
    inner: Rc<Controller<A, R, F, S>>,
}

impl<A, R, F, S> Debounced<A, R, F, S>
where
    A: 'static,
    R: Clone + 'static,
    F: Fn(A) -> R + 'static,
    S: Scheduler + 'static,
{
    pub(crate) fn with_policy(func: F, policy: Policy, scheduler: S) -> Self {
        Self {
            inner: Rc::new(Controller {
                func,
                scheduler,
                policy,
                state: RefCell::new(CycleState::new()),
                #[cfg(feature = "metrics")]
                metrics: RateMetrics::default(),
            }),
        }
    }

    /// Records a call and returns either the result of an immediate
    /// invocation or the result of the previous one (`None` before the
    /// first invocation).
    pub fn call(&self, args: A) -> Option<R> {
        self.inner.call(args)
    }

    /// Drops the pending invocation, if any, and resets the controller to
    /// its initial state. No trailing invocation of the canceled cycle runs.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Runs a pending trailing invocation right away.
    ///
    /// Without a pending timer, or with `trailing` disabled, returns the
    /// cached result without invoking.
    pub fn flush(&self) -> Option<R> {
        self.inner.flush()
    }

    /// Returns `true` while a timer is armed.
    pub fn pending(&self) -> bool {
        self.inner.state.borrow().timer.is_some()
    }

    /// Effective wait in milliseconds.
    pub fn wait(&self) -> Millis {
        Millis::new(self.inner.policy.wait)
    }

    /// Effective max wait in milliseconds.
    pub fn max_wait(&self) -> Option<Millis> {
        self.inner.policy.max_wait.map(Millis::new)
    }
}

impl<A, R, F, S> Clone for Debounced<A, R, F, S>
where
    S: Scheduler,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, R, F, S> fmt::Debug for Debounced<A, R, F, S>
where
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Debounced")
            .field("policy", &self.inner.policy)
            .field("last_call", &state.last_call)
            .field("last_invoke", &state.last_invoke)
            .field("pending", &state.timer.is_some())
            .finish()
    }
}

#[cfg(feature = "metrics")]
impl<A, R, F, S> Debounced<A, R, F, S>
where
    S: Scheduler,
{
    pub fn metrics_snapshot(&self) -> RateMetricsSnapshot {
        let metrics = &self.inner.metrics;
        RateMetricsSnapshot {
            calls: metrics.calls.get(),
            invocations: metrics.invocations.get(),
            timers_armed: metrics.timers_armed.get(),
            timers_fired: metrics.timers_fired.get(),
            cancels: metrics.cancels.get(),
            flushes: metrics.flushes.get(),
            pending: self.inner.state.borrow().timer.is_some(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<A, R, F, S> MetricsReset for Debounced<A, R, F, S>
where
    S: Scheduler,
{
    /// Zeroes the counters shared by every clone of this handle. A pending
    /// timer stays armed.
    fn reset_metrics(&self) {
        self.inner.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<A, R, F, S> MetricsSnapshotProvider<RateMetricsSnapshot> for Debounced<A, R, F, S>
where
    S: Scheduler,
{
    fn snapshot(&self) -> RateMetricsSnapshot {
        self.metrics_snapshot()
    }
}

/// Debounces `func`: calls are deferred until `wait` has passed without a
/// new call, subject to `options`.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use callkit::options::DebounceOptions;
/// use callkit::rate::debounce;
/// use callkit::time::ManualScheduler;
///
/// let sched = Rc::new(ManualScheduler::new());
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = Rc::clone(&seen);
/// let save = debounce(
///     move |text: &'static str| log.borrow_mut().push(text),
///     100,
///     DebounceOptions::default(),
///     Rc::clone(&sched),
/// );
///
/// save.call("h");
/// sched.advance(30);
/// save.call("he");
/// sched.advance(30);
/// save.call("hey");
/// assert!(seen.borrow().is_empty());
///
/// sched.advance(100);
/// assert_eq!(*seen.borrow(), vec!["hey"]);
/// ```
pub fn debounce<A, R, F, S>(
    func: F,
    wait: impl Into<Millis>,
    options: DebounceOptions,
    scheduler: S,
) -> Debounced<A, R, F, S>
where
    A: 'static,
    R: Clone + 'static,
    F: Fn(A) -> R + 'static,
    S: Scheduler + 'static,
{
    Debounced::with_policy(func, Policy::debounce(wait.into(), options), scheduler)
}
