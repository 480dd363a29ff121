#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub removals: u64,
    pub clears: u64,

    pub peek_calls: u64,
    pub peek_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub max_size: usize,
}

impl CacheMetricsSnapshot {
    /// Fraction of `get` calls that hit, or `0.0` before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RateMetricsSnapshot {
    pub calls: u64,
    pub invocations: u64,
    pub timers_armed: u64,
    pub timers_fired: u64,
    pub cancels: u64,
    pub flushes: u64,

    pub pending: bool,
}
