//! Edge-triggered proximity threshold watches
//!
//! A watch notifies once when the median round trip first drops to its
//! threshold, then stays quiet until the object has left the threshold
//! range again. Re-arming is silent: leaving the range produces no
//! notification, only eligibility for the next one.

use heapless::Vec;

/// Maximum number of registered watches
pub const MAX_WATCHES: usize = 8;

/// Watch lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchState {
    /// Object not yet inside the threshold; eligible to notify
    Armed,
    /// Object currently inside the threshold; waiting for it to leave
    Fired,
}

#[derive(Debug, Clone)]
struct ThresholdWatch<H> {
    threshold_us: u32,
    state: WatchState,
    handler: H,
}

/// Registry of threshold watches, evaluated once per sampling cycle
///
/// `H` is an opaque per-watch payload (the drivers attach a handler
/// function); the registry itself never invokes it, it only hands it to
/// the `notify` callback on an armed-to-fired transition.
///
/// Watches live for the registry's lifetime; there is no removal.
/// Registering the same threshold twice yields two independent watches.
#[derive(Debug)]
pub struct WatchRegistry<H> {
    watches: Vec<ThresholdWatch<H>, MAX_WATCHES>,
}

impl<H> WatchRegistry<H> {
    pub const fn new() -> Self {
        Self {
            watches: Vec::new(),
        }
    }

    /// Register a new watch in the armed state
    ///
    /// Returns `false` if the registry is full; the watch is dropped.
    pub fn register(&mut self, threshold_us: u32, handler: H) -> bool {
        self.watches
            .push(ThresholdWatch {
                threshold_us,
                state: WatchState::Armed,
                handler,
            })
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Evaluate every watch against the current median round trip
    ///
    /// Calls `notify` with the payload and threshold of each watch that
    /// transitions armed -> fired. Fired watches whose threshold the
    /// median has risen back above re-arm without notification.
    pub fn evaluate(&mut self, median_us: u32, mut notify: impl FnMut(&H, u32)) {
        for watch in self.watches.iter_mut() {
            match watch.state {
                WatchState::Armed if median_us <= watch.threshold_us => {
                    watch.state = WatchState::Fired;
                    notify(&watch.handler, watch.threshold_us);
                }
                WatchState::Fired if median_us > watch.threshold_us => {
                    watch.state = WatchState::Armed;
                }
                _ => {}
            }
        }
    }
}

impl<H> Default for WatchRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired_thresholds(registry: &mut WatchRegistry<()>, median_us: u32) -> std::vec::Vec<u32> {
        let mut fired = std::vec::Vec::new();
        registry.evaluate(median_us, |(), threshold| fired.push(threshold));
        fired
    }

    #[test]
    fn test_fires_once_on_entry() {
        let mut registry = WatchRegistry::new();
        registry.register(1160, ());

        assert_eq!(fired_thresholds(&mut registry, 2000), &[] as &[u32]);
        assert_eq!(fired_thresholds(&mut registry, 1160), &[1160]);
        // Still inside: no repeat notification
        assert_eq!(fired_thresholds(&mut registry, 900), &[] as &[u32]);
    }

    #[test]
    fn test_rearms_silently_on_exit() {
        let mut registry = WatchRegistry::new();
        registry.register(1160, ());

        assert_eq!(fired_thresholds(&mut registry, 1000), &[1160]);
        // Leaving the range re-arms but does not notify
        assert_eq!(fired_thresholds(&mut registry, 5000), &[] as &[u32]);
        // Next entry notifies again
        assert_eq!(fired_thresholds(&mut registry, 1000), &[1160]);
    }

    #[test]
    fn test_oscillation_fires_once_per_entry() {
        let mut registry = WatchRegistry::new();
        registry.register(1160, ());

        let mut notifications = 0;
        for cycle in 0..10 {
            let median = if cycle % 2 == 0 { 1000 } else { 5000 };
            registry.evaluate(median, |(), _| notifications += 1);
        }
        // 10 alternating cycles = 5 entries
        assert_eq!(notifications, 5);
    }

    #[test]
    fn test_duplicate_registrations_are_independent() {
        let mut registry = WatchRegistry::new();
        registry.register(1160, ());
        registry.register(1160, ());

        assert_eq!(fired_thresholds(&mut registry, 1000), &[1160, 1160]);
    }

    #[test]
    fn test_registry_capacity() {
        let mut registry = WatchRegistry::new();
        for _ in 0..MAX_WATCHES {
            assert!(registry.register(1160, ()));
        }
        assert!(!registry.register(1160, ()));
        assert_eq!(registry.len(), MAX_WATCHES);

        // The admitted watches still fire
        assert_eq!(fired_thresholds(&mut registry, 1000).len(), MAX_WATCHES);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let mut registry = WatchRegistry::new();
        registry.register(1160, ());

        // Exactly at threshold fires
        assert_eq!(fired_thresholds(&mut registry, 1160), &[1160]);
        // Staying at threshold keeps it fired
        assert_eq!(fired_thresholds(&mut registry, 1160), &[] as &[u32]);
        // One past the threshold re-arms silently
        assert_eq!(fired_thresholds(&mut registry, 1161), &[] as &[u32]);
        assert_eq!(fired_thresholds(&mut registry, 1160), &[1160]);
    }
}
