//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and resetting are split into small traits so the
//! cache and the rate controllers only ever write counters, while tests and
//! benches read them through snapshots.
//!
//! ```text
//!   ┌──────────────────────────┐        ┌──────────────────────────┐
//!   │  CacheMetricsRecorder    │        │  RateMetricsRecorder     │
//!   │  get_hit/get_miss        │        │  call/invocation         │
//!   │  insert/evict/remove     │        │  timer armed/fired       │
//!   │  clear                   │        │  cancel/flush            │
//!   └────────────┬─────────────┘        └────────────┬─────────────┘
//!                │                                   │
//!                ▼                                   ▼
//!          BoundedCache                          Debounced
//!
//!   Consumption:
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters for a bounded cache.
pub trait CacheMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_remove(&mut self);
    fn record_clear(&mut self);
}

/// Counters for `&self` cache reads (uses interior mutability).
pub trait CacheMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Counters for a debounce/throttle controller.
pub trait RateMetricsRecorder {
    fn record_call(&self);
    fn record_invocation(&self);
    fn record_timer_armed(&self);
    fn record_timer_fired(&self);
    fn record_cancel(&self);
    fn record_flush(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
