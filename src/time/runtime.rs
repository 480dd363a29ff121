//! [`Scheduler`] backed by the tokio timer wheel (cargo feature `tokio`).
//!
//! Each timer is one local task sleeping for its delay, so the scheduler
//! must live inside a [`tokio::task::LocalSet`]; callbacks are `!Send` and
//! stay on that thread.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::options::Millis;
use crate::time::clock::Clock;
use crate::time::scheduler::{Scheduler, TimerCallback, TimerHandle};

#[derive(Default)]
struct Tasks {
    next_id: Cell<u64>,
    live: RefCell<FxHashMap<u64, JoinHandle<()>>>,
}

/// Scheduler spawning timers with `tokio::task::spawn_local`.
///
/// # Panics
///
/// [`Scheduler::schedule`] panics when called outside a `LocalSet`.
#[derive(Clone)]
pub struct TokioScheduler {
    origin: Instant,
    tasks: Rc<Tasks>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            tasks: Rc::default(),
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.tasks.live.borrow().len()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioScheduler {
    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Millis, callback: TimerCallback) -> TimerHandle {
        let id = self.tasks.next_id.get();
        self.tasks.next_id.set(id + 1);

        let tasks = Rc::downgrade(&self.tasks);
        let task = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay.into()).await;
            if let Some(tasks) = tasks.upgrade() {
                tasks.live.borrow_mut().remove(&id);
            }
            callback();
        });
        self.tasks.live.borrow_mut().insert(id, task);
        TimerHandle::from_raw(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let task = self.tasks.live.borrow_mut().remove(&handle.as_raw());
        match task {
            Some(task) => {
                task.abort();
                true
            },
            None => false,
        }
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::task::LocalSet;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay_on_local_set() {
        LocalSet::new()
            .run_until(async {
                let sched = TokioScheduler::new();
                let fired = Rc::new(Cell::new(None));
                let slot = Rc::clone(&fired);
                let clock = sched.clone();
                sched.schedule(
                    Millis::new(40),
                    Box::new(move || slot.set(Some(clock.now()))),
                );
                assert_eq!(sched.pending_timers(), 1);

                tokio::time::sleep(Duration::from_millis(39)).await;
                assert_eq!(fired.get(), None);

                tokio::time::sleep(Duration::from_millis(2)).await;
                assert!(matches!(fired.get(), Some(at) if at >= 40));
                assert_eq!(sched.pending_timers(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_timer_is_aborted() {
        LocalSet::new()
            .run_until(async {
                let sched = TokioScheduler::new();
                let fired = Rc::new(Cell::new(false));
                let flag = Rc::clone(&fired);
                let handle = sched.schedule(Millis::new(10), Box::new(move || flag.set(true)));

                assert!(sched.cancel(handle));
                assert!(!sched.cancel(handle));
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(!fired.get());
            })
            .await;
    }
}
