//! Error types for callkit.
//!
//! Configuration is normalized rather than rejected (negative waits clamp to
//! zero, a zero cache bound means "unbounded"), and failures of wrapped
//! functions are handed back to the caller untouched. The only error the
//! crate produces itself is [`InvariantError`], returned by the
//! `check_invariants` methods on the recency list and the bounded cache.
//!
//! ## Example Usage
//!
//! ```
//! use callkit::cache::BoundedCache;
//! use callkit::error::InvariantError;
//!
//! let mut cache = BoundedCache::new(2);
//! cache.insert("a", 1);
//! let checked: Result<(), InvariantError> = cache.check_invariants();
//! assert!(checked.is_ok());
//! ```

use std::fmt;

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}
