//! Bounded window of recent round-trip samples

use heapless::Vec;

use super::median::lower_median;
use crate::units::MAX_TRAVEL_TIME_US;

/// Number of samples the median is computed over
pub const WINDOW_SIZE: usize = 3;

/// One extra slot so an in-flight echo can land between trims
const CAPACITY: usize = WINDOW_SIZE + 1;

/// A single round-trip measurement
///
/// Either a real echo or a synthetic timeout sample with
/// `travel_time_us == MAX_TRAVEL_TIME_US` ("nothing detected").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoundTrip {
    /// Monotonic timestamp of the measurement, in milliseconds
    pub timestamp_ms: u64,
    /// Echo round-trip time in microseconds
    pub travel_time_us: u32,
}

/// Time-ordered buffer of the most recent round trips, oldest first
///
/// Never empty: a new window holds one synthetic max-range sample, and
/// eviction always leaves `WINDOW_SIZE` entries behind. Real echoes are
/// only admitted while fewer than `WINDOW_SIZE + 1` samples are pending,
/// which bounds growth from closely-spaced double triggers; anything
/// over capacity is dropped, not buffered.
#[derive(Debug, Clone)]
pub struct RoundTripWindow {
    samples: Vec<RoundTrip, CAPACITY>,
}

impl RoundTripWindow {
    /// Create a window seeded with the max-range sentinel
    pub fn new() -> Self {
        let mut samples = Vec::new();
        let _ = samples.push(RoundTrip {
            timestamp_ms: 0,
            travel_time_us: MAX_TRAVEL_TIME_US,
        });
        Self { samples }
    }

    /// Record a real echo measurement
    ///
    /// Returns whether the sample was admitted. Echoes at or beyond the
    /// maximum travel time are rejected (indistinguishable from "no
    /// object"), as are echoes arriving while the window is already at
    /// pending capacity.
    pub fn record(&mut self, timestamp_ms: u64, travel_time_us: u32) -> bool {
        if travel_time_us >= MAX_TRAVEL_TIME_US {
            return false;
        }
        if self.samples.len() > WINDOW_SIZE {
            return false;
        }
        self.samples
            .push(RoundTrip {
                timestamp_ms,
                travel_time_us,
            })
            .is_ok()
    }

    /// Record a synthetic timeout sample ("no echo arrived")
    ///
    /// Unlike real echoes this is never dropped; if the window is at
    /// capacity the oldest sample is evicted to make room, so a sensor
    /// that stops responding still converges to max range.
    pub fn record_timeout(&mut self, timestamp_ms: u64) {
        if self.samples.is_full() {
            self.samples.remove(0);
        }
        let _ = self.samples.push(RoundTrip {
            timestamp_ms,
            travel_time_us: MAX_TRAVEL_TIME_US,
        });
    }

    /// Whether no sample has arrived within `max_age_ms` of `now_ms`
    pub fn is_stale(&self, now_ms: u64, max_age_ms: u64) -> bool {
        match self.samples.last() {
            Some(latest) => latest.timestamp_ms < now_ms.saturating_sub(max_age_ms),
            None => true,
        }
    }

    /// Evict from the front until at most `WINDOW_SIZE` samples remain
    pub fn trim(&mut self) {
        while self.samples.len() > WINDOW_SIZE {
            self.samples.remove(0);
        }
    }

    /// Lower median of the current travel times
    pub fn median_travel_time_us(&self) -> u32 {
        let mut times: Vec<u32, CAPACITY> = self
            .samples
            .iter()
            .map(|sample| sample.travel_time_us)
            .collect();
        lower_median(&mut times).unwrap_or(MAX_TRAVEL_TIME_US)
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for RoundTripWindow {
    fn default() -> Self {
        Self::new()
    }
}
