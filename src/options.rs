//! Options for the rate controllers and memoizers.
//!
//! Every numeric option is normalized on the way in instead of being
//! validated: time quantities become [`Millis`] (whole, non-negative
//! milliseconds) and a cache bound of `0` means "unbounded".
//!
//! | Options            | Field       | Default | Meaning                               |
//! |--------------------|-------------|---------|---------------------------------------|
//! | `DebounceOptions`  | `leading`   | `false` | invoke on the call that opens a cycle |
//! |                    | `trailing`  | `true`  | invoke when the wait elapses          |
//! |                    | `max_wait`  | `None`  | ceiling between two invocations       |
//! | `ThrottleOptions`  | `leading`   | `true`  | as above                              |
//! |                    | `trailing`  | `true`  | as above                              |
//! | `MemoizeOptions`   | `max_size`  | `0`     | LRU bound, `0` disables eviction      |
//!
//! ## Example
//!
//! ```
//! use callkit::options::{DebounceOptions, Millis};
//!
//! let opts = DebounceOptions::default().leading(true).max_wait(250);
//! assert_eq!(opts.max_wait, Some(Millis::new(250)));
//!
//! // Fractions truncate, negatives clamp to zero.
//! assert_eq!(Millis::from(12.9_f64).get(), 12);
//! assert_eq!(Millis::from(-40_i64), Millis::ZERO);
//! ```

use std::time::Duration;

/// A non-negative whole number of milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    #[inline]
    pub const fn new(ms: u64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Millis {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl From<u32> for Millis {
    fn from(ms: u32) -> Self {
        Self(u64::from(ms))
    }
}

impl From<usize> for Millis {
    fn from(ms: usize) -> Self {
        Self(u64::try_from(ms).unwrap_or(u64::MAX))
    }
}

impl From<i64> for Millis {
    fn from(ms: i64) -> Self {
        Self(u64::try_from(ms).unwrap_or(0))
    }
}

impl From<i32> for Millis {
    fn from(ms: i32) -> Self {
        Self::from(i64::from(ms))
    }
}

impl From<f64> for Millis {
    /// Truncates toward zero. NaN and negatives become zero, `+inf` saturates.
    fn from(ms: f64) -> Self {
        // `as` casts from float saturate and map NaN to 0.
        Self(ms.trunc() as u64)
    }
}

impl From<Duration> for Millis {
    fn from(d: Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl From<Millis> for Duration {
    fn from(ms: Millis) -> Self {
        Duration::from_millis(ms.0)
    }
}

/// Options for [`debounce`](crate::rate::debounce::debounce).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOptions {
    pub leading: bool,
    pub trailing: bool,
    pub max_wait: Option<Millis>,
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self {
            leading: false,
            trailing: true,
            max_wait: None,
        }
    }
}

impl DebounceOptions {
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    pub fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn max_wait(mut self, max_wait: impl Into<Millis>) -> Self {
        self.max_wait = Some(max_wait.into());
        self
    }
}

/// Options for [`throttle`](crate::rate::throttle::throttle).
///
/// There is no `max_wait`: a throttle always pins it to its wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleOptions {
    pub leading: bool,
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

impl ThrottleOptions {
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    pub fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }
}

/// Options for the memoizers in [`memo`](crate::memo).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoizeOptions {
    /// Maximum number of cached entries; `0` keeps every entry.
    pub max_size: usize,
}

impl MemoizeOptions {
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}
