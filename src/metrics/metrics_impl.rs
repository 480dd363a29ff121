use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CacheMetricsReadRecorder, CacheMetricsRecorder, MetricsReset, RateMetricsRecorder,
};

/// Cache counters. Cells rather than plain integers: `peek` records
/// through `&self` and the cache may be shared across threads.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub insert_new: MetricsCell,
    pub insert_updates: MetricsCell,
    pub evicted_entries: MetricsCell,
    pub removals: MetricsCell,
    pub clears: MetricsCell,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

impl CacheMetricsRecorder for CacheMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    fn record_get_miss(&mut self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }

    fn record_insert_new(&mut self) {
        self.insert_new.incr();
    }

    fn record_insert_update(&mut self) {
        self.insert_updates.incr();
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries.incr();
    }

    fn record_remove(&mut self) {
        self.removals.incr();
    }

    fn record_clear(&mut self) {
        self.clears.incr();
    }
}

impl CacheMetricsReadRecorder for &CacheMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}

impl MetricsReset for CacheMetrics {
    fn reset_metrics(&self) {
        self.get_calls.reset();
        self.get_hits.reset();
        self.get_misses.reset();
        self.insert_new.reset();
        self.insert_updates.reset();
        self.evicted_entries.reset();
        self.removals.reset();
        self.clears.reset();
        self.peek_calls.reset();
        self.peek_found.reset();
    }
}

/// Controller counters; every field is a cell because the controller only
/// ever hands out `&self`.
#[derive(Debug, Default)]
pub struct RateMetrics {
    pub calls: MetricsCell,
    pub invocations: MetricsCell,
    pub timers_armed: MetricsCell,
    pub timers_fired: MetricsCell,
    pub cancels: MetricsCell,
    pub flushes: MetricsCell,
}

impl RateMetricsRecorder for RateMetrics {
    fn record_call(&self) {
        self.calls.incr();
    }

    fn record_invocation(&self) {
        self.invocations.incr();
    }

    fn record_timer_armed(&self) {
        self.timers_armed.incr();
    }

    fn record_timer_fired(&self) {
        self.timers_fired.incr();
    }

    fn record_cancel(&self) {
        self.cancels.incr();
    }

    fn record_flush(&self) {
        self.flushes.incr();
    }
}

impl MetricsReset for RateMetrics {
    fn reset_metrics(&self) {
        self.calls.reset();
        self.invocations.reset();
        self.timers_armed.reset();
        self.timers_fired.reset();
        self.cancels.reset();
        self.flushes.reset();
    }
}
