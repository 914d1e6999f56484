//! Per-sensor ranging state, updated once per sampling cycle

use super::watch::WatchRegistry;
use super::window::RoundTripWindow;
use crate::units::{DistanceUnit, MAX_TRAVEL_TIME_US};

/// Everything the sampling loop and the query facade share for one sensor
///
/// The window is fed asynchronously by echo capture; `cycle` is called on
/// the sampling cadence and performs the bookkeeping steps in order:
/// synthesize a timeout sample if the window went stale, trim to the
/// window size, recompute the cached median, evaluate the watches.
///
/// `H` is the watch payload type (see [`WatchRegistry`]).
#[derive(Debug)]
pub struct RangingState<H> {
    window: RoundTripWindow,
    median_travel_us: u32,
    watches: WatchRegistry<H>,
}

impl<H> RangingState<H> {
    /// Fresh state: sentinel-seeded window, max-range median, no watches
    pub fn new() -> Self {
        Self {
            window: RoundTripWindow::new(),
            median_travel_us: MAX_TRAVEL_TIME_US,
            watches: WatchRegistry::new(),
        }
    }

    /// Feed a real echo measurement into the window
    ///
    /// Safe to call between any two cycles; admission policy is the
    /// window's (drop when out of range or at pending capacity).
    pub fn record_echo(&mut self, timestamp_ms: u64, travel_time_us: u32) -> bool {
        self.window.record(timestamp_ms, travel_time_us)
    }

    /// Register a proximity watch; `false` when the registry is full
    pub fn register_watch(&mut self, threshold_us: u32, handler: H) -> bool {
        self.watches.register(threshold_us, handler)
    }

    /// Run one sampling cycle's state update
    ///
    /// `max_age_ms` is the staleness horizon (cadence plus jitter slack).
    /// `notify` receives the payload and threshold of every watch that
    /// fires this cycle.
    pub fn cycle(&mut self, now_ms: u64, max_age_ms: u64, notify: impl FnMut(&H, u32)) {
        if self.window.is_stale(now_ms, max_age_ms) {
            self.window.record_timeout(now_ms);
        }
        self.window.trim();
        self.median_travel_us = self.window.median_travel_time_us();
        self.watches.evaluate(self.median_travel_us, notify);
    }

    /// Median round trip cached by the last `cycle` call
    pub fn median_travel_us(&self) -> u32 {
        self.median_travel_us
    }

    /// Cached median converted to a distance
    pub fn distance_in(&self, unit: DistanceUnit) -> u32 {
        unit.distance_from_travel_time(self.median_travel_us)
    }

    /// Whether the cached median reads strictly closer than `distance`
    pub fn is_closer_than(&self, distance: u32, unit: DistanceUnit) -> bool {
        self.distance_in(unit) < distance
    }

    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }
}

impl<H> Default for RangingState<H> {
    fn default() -> Self {
        Self::new()
    }
}
