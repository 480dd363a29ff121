pub use crate::cache::BoundedCache;
pub use crate::error::InvariantError;
pub use crate::memo::{
    AsyncMemoized, InFlight, Memoized, SharedCache, SharedResult, memoize, memoize_async,
    memoize_async_with, memoize_with, shared_cache,
};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{CacheMetricsSnapshot, RateMetricsSnapshot};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};
pub use crate::once::{Once, OnceAsync, once, once_async};
pub use crate::options::{DebounceOptions, MemoizeOptions, Millis, ThrottleOptions};
pub use crate::rate::{Debounced, Throttled, debounce, throttle};
pub use crate::time::{Clock, ManualScheduler, Scheduler, SystemClock, TimerHandle, defer, delay};
#[cfg(feature = "tokio")]
pub use crate::time::TokioScheduler;
