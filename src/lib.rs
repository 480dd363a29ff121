//! callkit: invocation-rate control and memoization primitives.
//!
//! - [`rate`]: debounce and throttle controllers driven by a
//!   [`Scheduler`](time::Scheduler).
//! - [`cache`]: [`BoundedCache`](cache::BoundedCache), a hash map plus
//!   recency list with an LRU size bound.
//! - [`memo`]: synchronous and asynchronous memoizers over that cache; the
//!   asynchronous one deduplicates in-flight calls.
//! - [`once`]: run-once wrappers.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod cache;
pub mod ds;
pub mod error;
pub mod memo;
pub mod once;
pub mod options;
pub mod rate;
pub mod time;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
