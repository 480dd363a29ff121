//! `defer` and `delay` on top of a [`Scheduler`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::options::Millis;
use crate::time::scheduler::{Scheduler, TimerHandle};

/// Runs `f` on the scheduler's next tick.
pub fn defer<S>(scheduler: &S, f: impl FnOnce() + 'static) -> TimerHandle
where
    S: Scheduler + ?Sized,
{
    scheduler.schedule(Millis::ZERO, Box::new(f))
}

/// Returns a future that completes once `ms` have elapsed on `scheduler`.
///
/// Resolves to `Err(Canceled)` if the timer is canceled through the
/// returned handle or dropped by the scheduler before firing.
pub fn delay<S>(scheduler: &S, ms: impl Into<Millis>) -> Delay
where
    S: Scheduler + ?Sized,
{
    let (tx, rx) = oneshot::channel();
    let handle = scheduler.schedule(
        ms.into(),
        Box::new(move || {
            // The receiver may already be gone; nothing to wake then.
            let _ = tx.send(());
        }),
    );
    Delay { rx, handle }
}

/// Future returned by [`delay`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Delay {
    rx: oneshot::Receiver<()>,
    handle: TimerHandle,
}

impl Delay {
    /// Handle of the underlying timer, for [`Scheduler::cancel`].
    pub fn handle(&self) -> TimerHandle {
        self.handle
    }
}

impl Future for Delay {
    type Output = Result<(), oneshot::Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx)
    }
}
