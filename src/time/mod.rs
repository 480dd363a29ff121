//! Clocks and schedulers consumed by the rate controllers.

pub mod clock;
pub mod delay;
pub mod scheduler;
#[cfg(feature = "tokio")]
pub mod runtime;

pub use clock::{Clock, SystemClock};
pub use delay::{Delay, defer, delay};
pub use scheduler::{ManualScheduler, Scheduler, TimerCallback, TimerHandle};
#[cfg(feature = "tokio")]
pub use runtime::TokioScheduler;
