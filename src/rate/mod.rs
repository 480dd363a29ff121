//! Rate controllers: debounce and throttle.
//!
//! Both wrap a function behind a [`Debounced`] controller that decides, per
//! call and per timer expiry, whether to invoke it now, later, or not at
//! all. Timing comes from a [`Scheduler`](crate::time::Scheduler).

pub mod debounce;
pub mod throttle;

pub use debounce::{Debounced, debounce};
pub use throttle::{Throttled, throttle};
