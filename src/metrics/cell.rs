use std::sync::atomic::{AtomicU64, Ordering};

/// A counter bumped through `&self`.
///
/// Relaxed atomics: counters are observational, no ordering is implied
/// between them.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(AtomicU64);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_increments_are_not_lost() {
        let cell = MetricsCell::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..10_000 {
                        cell.incr();
                    }
                });
            }
        });
        assert_eq!(cell.get(), 40_000);
        cell.reset();
        assert_eq!(cell.get(), 0);
    }
}
