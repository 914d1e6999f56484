//! Monotonic time abstraction

/// Free-running monotonic clock
///
/// Used for sample timestamps and staleness checks. The epoch is
/// arbitrary; only differences are meaningful. Implementations must
/// never go backwards.
pub trait Clock {
    /// Microseconds since an arbitrary epoch
    fn now_micros(&self) -> u64;

    /// Milliseconds since the same epoch
    fn now_millis(&self) -> u64 {
        self.now_micros() / 1000
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }

    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
