//! Deferred-callback scheduling.
//!
//! [`Scheduler`] is the seam between the rate controllers and whatever
//! event loop hosts them. [`ManualScheduler`] is a virtual-time
//! implementation: nothing fires until the host advances its clock, which
//! makes every timing decision reproducible.
//!
//! ## ManualScheduler timeline
//!
//! ```text
//!   now = 30                      advance(50) ──► now = 80
//!   ───────┬──────────┬──────────┬──────────┬──────────►
//!          │          │          │          │
//!        due 40     due 60     due 60     due 95
//!        seq 3      seq 1      seq 4      seq 2
//!          ▲          ▲          ▲          ▲
//!          fires 1st  fires 2nd  fires 3rd  stays queued
//! ```
//!
//! Timers fire in due order, ties in scheduling order. While a callback
//! runs, `now()` reports that timer's due time.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::options::Millis;
use crate::time::clock::Clock;

/// Opaque handle to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wraps a scheduler-specific id. Only schedulers should mint handles.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Callback run when a timer falls due.
pub type TimerCallback = Box<dyn FnOnce() + 'static>;

/// Cancelable deferred-callback facility plus the clock it is measured against.
///
/// Implementations must never fire a callback earlier than its delay, must
/// fire due callbacks in the order they became due, and must guarantee that
/// a callback whose timer was canceled never runs.
pub trait Scheduler: Clock {
    fn schedule(&self, delay: Millis, callback: TimerCallback) -> TimerHandle;

    /// Cancels a pending timer. Returns `false` if it already fired or was canceled.
    fn cancel(&self, handle: TimerHandle) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn schedule(&self, delay: Millis, callback: TimerCallback) -> TimerHandle {
        (**self).schedule(delay, callback)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        (**self).cancel(handle)
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Millis, callback: TimerCallback) -> TimerHandle {
        (**self).schedule(delay, callback)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        (**self).cancel(handle)
    }
}

#[derive(Default)]
struct Timeline {
    now: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), TimerCallback>,
    due_by_seq: FxHashMap<u64, u64>,
}

/// Virtual-time scheduler driven explicitly by its owner.
#[derive(Default)]
pub struct ManualScheduler {
    timeline: RefCell<Timeline>,
}

impl ManualScheduler {
    /// Creates a scheduler whose clock reads `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler whose clock starts at `now`.
    pub fn starting_at(now: u64) -> Self {
        let scheduler = Self::default();
        scheduler.timeline.borrow_mut().now = now;
        scheduler
    }

    /// Number of timers that have neither fired nor been canceled.
    pub fn pending_timers(&self) -> usize {
        self.timeline.borrow().queue.len()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<u64> {
        self.timeline
            .borrow()
            .queue
            .first_key_value()
            .map(|(&(due, _), _)| due)
    }

    /// Moves the clock forward by `ms`, firing every timer that falls due.
    pub fn advance(&self, ms: impl Into<Millis>) {
        let target = self.now().saturating_add(ms.into().get());
        self.advance_to(target);
    }

    /// Moves the clock forward to `target`, firing every timer due at or before it.
    ///
    /// A `target` in the past fires nothing and leaves the clock untouched.
    pub fn advance_to(&self, target: u64) {
        let mut fired = 0usize;
        while let Some(callback) = self.pop_due(target) {
            callback();
            fired += 1;
        }
        let mut timeline = self.timeline.borrow_mut();
        timeline.now = timeline.now.max(target);
        tracing::trace!(now = timeline.now, fired, "manual scheduler advanced");
    }

    /// Fires timers until none are left, including ones scheduled while firing.
    pub fn run_all(&self) {
        while let Some(due) = self.next_due() {
            self.advance_to(due);
        }
    }

    /// Sets the clock without firing anything; may move it backwards.
    pub fn set_time(&self, now: u64) {
        self.timeline.borrow_mut().now = now;
    }

    fn pop_due(&self, target: u64) -> Option<TimerCallback> {
        let mut timeline = self.timeline.borrow_mut();
        let (&(due, _), _) = timeline.queue.first_key_value()?;
        if due > target {
            return None;
        }
        let ((due, seq), callback) = timeline.queue.pop_first()?;
        timeline.due_by_seq.remove(&seq);
        timeline.now = timeline.now.max(due);
        Some(callback)
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> u64 {
        self.timeline.borrow().now
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Millis, callback: TimerCallback) -> TimerHandle {
        let mut timeline = self.timeline.borrow_mut();
        let seq = timeline.next_seq;
        timeline.next_seq += 1;
        let due = timeline.now.saturating_add(delay.get());
        timeline.queue.insert((due, seq), callback);
        timeline.due_by_seq.insert(seq, due);
        TimerHandle(seq)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut timeline = self.timeline.borrow_mut();
        match timeline.due_by_seq.remove(&handle.0) {
            Some(due) => timeline.queue.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeline = self.timeline.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &timeline.now)
            .field("pending_timers", &timeline.queue.len())
            .finish()
    }
}
