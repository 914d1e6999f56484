//! Ultrasonic ranger driver
//!
//! The sensor is a trigger/echo device: a short pulse on the trigger pin
//! starts a measurement, and the echo pin reports the round-trip time as
//! a pulse width. [`Sonar::run`] owns both pins and samples continuously;
//! the rest of the API is a non-blocking facade over state shared with
//! that loop.
//!
//! Distances follow the board's sign convention: `-1` means the sensor
//! was never connected, the maximum range means nothing is in view.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use robokit_core::ranging::{RangingState, MAX_WATCHES};
use robokit_core::units::DistanceUnit;
use robokit_hal::{Clock, OutputPin, PulseCapture};

/// Callback invoked from the sampling loop when a proximity watch fires
pub type ProximityHandler = fn();

/// Sampling loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SonarConfig {
    /// Time between trigger pulses, in milliseconds
    pub interval_ms: u32,
    /// Staleness allowance on top of the interval, in milliseconds
    ///
    /// An echo older than `interval_ms + staleness_slack_ms` means the
    /// sensor missed a cycle; the loop then records a timeout sample.
    pub staleness_slack_ms: u32,
}

impl SonarConfig {
    pub const DEFAULT: Self = Self {
        interval_ms: 145,
        staleness_slack_ms: 10,
    };
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Ultrasonic ranger with a background sampling loop
///
/// Constructed `const`, so it can live in a `static` and be shared
/// between the task running [`Sonar::run`] and any number of querying
/// tasks. All facade methods are non-blocking.
pub struct Sonar<M: RawMutex = CriticalSectionRawMutex> {
    state: Mutex<M, RefCell<Option<RangingState<ProximityHandler>>>>,
    stop: Signal<M, ()>,
    running: AtomicBool,
    config: SonarConfig,
}

impl<M: RawMutex> Sonar<M> {
    pub const fn new() -> Self {
        Self::with_config(SonarConfig::DEFAULT)
    }

    pub const fn with_config(config: SonarConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(None)),
            stop: Signal::new(),
            running: AtomicBool::new(false),
            config,
        }
    }

    /// Register a handler that fires when an object comes within
    /// `distance` of the sensor
    ///
    /// Edge triggered: the handler runs once when the reading crosses
    /// under the threshold and re-arms silently once it moves back out.
    /// Thresholds at or below zero are ignored, as are registrations
    /// beyond the watch capacity.
    ///
    /// Registration alone primes the sensor state, so [`Sonar::distance`]
    /// stops returning `-1` even before [`Sonar::run`] is started.
    pub fn on_object_detected(&self, distance: i32, unit: DistanceUnit, handler: ProximityHandler) {
        if distance <= 0 {
            return;
        }
        let threshold_us = unit.threshold_us(distance as u32);
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            let state = state.get_or_insert_with(RangingState::new);
            let _ = state.register_watch(threshold_us, handler);
        });
    }

    /// Latest distance estimate in the requested unit
    ///
    /// `-1` until the sensor is connected or a watch is registered;
    /// the maximum range while nothing reflects. Yields once before
    /// reading so a tight polling loop cannot starve the sampler.
    pub async fn distance(&self, unit: DistanceUnit) -> i32 {
        yield_now().await;
        self.state.lock(|cell| {
            cell.borrow()
                .as_ref()
                .map_or(-1, |state| state.distance_in(unit) as i32)
        })
    }

    /// Whether the latest estimate is strictly closer than `distance`
    ///
    /// `false` when the sensor was never connected or `distance` is not
    /// positive.
    pub async fn is_closer_than(&self, distance: i32, unit: DistanceUnit) -> bool {
        yield_now().await;
        if distance <= 0 {
            return false;
        }
        self.state.lock(|cell| {
            cell.borrow()
                .as_ref()
                .is_some_and(|state| state.is_closer_than(distance as u32, unit))
        })
    }

    /// Ask a running sampling loop to exit after its current cycle
    pub fn stop(&self) {
        self.stop.signal(());
    }

    /// Connect the sensor and sample until [`Sonar::stop`] is called
    ///
    /// Drives the trigger pin on the configured cadence and feeds echo
    /// pulse widths into the shared state. Watch handlers run on this
    /// task, outside the state lock. Idempotent: while one call is
    /// running, further calls return immediately.
    pub async fn run<T, E, D, C>(&self, trig: T, echo: E, delay: D, clock: C)
    where
        T: OutputPin,
        E: PulseCapture,
        D: DelayNs,
        C: Clock,
    {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            state.get_or_insert_with(RangingState::new);
        });

        select(
            self.sample_loop(trig, delay, &clock),
            self.capture_loop(echo, &clock),
        )
        .await;

        self.running.store(false, Ordering::Release);
    }

    async fn sample_loop<T, D>(&self, mut trig: T, mut delay: D, clock: &impl Clock)
    where
        T: OutputPin,
        D: DelayNs,
    {
        let max_age_ms = (self.config.interval_ms + self.config.staleness_slack_ms) as u64;
        loop {
            let now_ms = clock.now_millis();
            let fired = self.state.lock(|cell| {
                let mut fired: Vec<ProximityHandler, MAX_WATCHES> = Vec::new();
                if let Some(state) = cell.borrow_mut().as_mut() {
                    state.cycle(now_ms, max_age_ms, |handler, _| {
                        let _ = fired.push(*handler);
                    });
                }
                fired
            });
            // Handlers run with the lock released; a slow handler delays
            // the next trigger pulse but cannot block the facade
            for handler in fired {
                handler();
            }

            trigger_pulse(&mut trig, &mut delay).await;

            match select(self.stop.wait(), delay.delay_ms(self.config.interval_ms)).await {
                Either::First(()) => break,
                Either::Second(()) => {}
            }
        }
    }

    async fn capture_loop<E: PulseCapture>(&self, mut echo: E, clock: &impl Clock) {
        loop {
            let travel_time_us = echo.next_pulse_us().await;
            let timestamp_ms = clock.now_millis();
            self.state.lock(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    state.record_echo(timestamp_ms, travel_time_us);
                }
            });
        }
    }
}

impl<M: RawMutex> Default for Sonar<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit one measurement trigger: 2 µs settle low, then a 10 µs pulse
async fn trigger_pulse<T: OutputPin, D: DelayNs>(trig: &mut T, delay: &mut D) {
    trig.set_low();
    delay.delay_us(2).await;
    trig.set_high();
    delay.delay_us(10).await;
    trig.set_low();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::block_on;
    use core::cell::Cell;
    use core::future;
    use core::sync::atomic::AtomicUsize;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use robokit_core::units::DistanceUnit::{Centimeters, Inches};
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        High,
        Low,
        DelayNs(u32),
    }

    struct RecordingPin<'a> {
        log: &'a RefCell<Vec<Event>>,
        high: bool,
    }

    impl<'a> RecordingPin<'a> {
        fn new(log: &'a RefCell<Vec<Event>>) -> Self {
            Self { log, high: false }
        }
    }

    impl OutputPin for RecordingPin<'_> {
        fn set_high(&mut self) {
            self.high = true;
            self.log.borrow_mut().push(Event::High);
        }

        fn set_low(&mut self) {
            self.high = false;
            self.log.borrow_mut().push(Event::Low);
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct FakeClock {
        now_us: Cell<u64>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self { now_us: Cell::new(0) }
        }

        fn advance_ns(&self, ns: u32) {
            self.now_us.set(self.now_us.get() + u64::from(ns) / 1000);
        }
    }

    impl Clock for FakeClock {
        fn now_micros(&self) -> u64 {
            self.now_us.get()
        }
    }

    /// Delay that advances the fake clock, yields once per await, and
    /// stops the sonar after a set number of cadence sleeps
    struct FakeDelay<'a> {
        clock: &'a FakeClock,
        sonar: &'a Sonar<NoopRawMutex>,
        sleeps_left: u32,
        log: Option<&'a RefCell<Vec<Event>>>,
    }

    impl<'a> FakeDelay<'a> {
        fn new(clock: &'a FakeClock, sonar: &'a Sonar<NoopRawMutex>, sleeps: u32) -> Self {
            Self {
                clock,
                sonar,
                sleeps_left: sleeps,
                log: None,
            }
        }
    }

    impl DelayNs for FakeDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.clock.advance_ns(ns);
            if let Some(log) = self.log {
                log.borrow_mut().push(Event::DelayNs(ns));
            }
            // Cadence sleeps are the long ones; trigger delays are µs
            if ns >= 1_000_000 {
                if self.sleeps_left <= 1 {
                    self.sonar.stop();
                }
                self.sleeps_left = self.sleeps_left.saturating_sub(1);
            }
            yield_now().await;
        }
    }

    /// Echo pin that reports a scripted pulse per poll, then goes quiet
    struct ScriptedEcho {
        pulses: Vec<u32>,
        next: usize,
    }

    impl ScriptedEcho {
        fn new(pulses: &[u32]) -> Self {
            Self {
                pulses: pulses.to_vec(),
                next: 0,
            }
        }
    }

    impl PulseCapture for ScriptedEcho {
        async fn next_pulse_us(&mut self) -> u32 {
            yield_now().await;
            if self.next < self.pulses.len() {
                let pulse = self.pulses[self.next];
                self.next += 1;
                pulse
            } else {
                future::pending().await
            }
        }
    }

    fn fixture() -> (Sonar<NoopRawMutex>, FakeClock, RefCell<Vec<Event>>) {
        (Sonar::new(), FakeClock::new(), RefCell::new(Vec::new()))
    }

    #[test]
    fn test_facade_before_connect() {
        let sonar: Sonar<NoopRawMutex> = Sonar::new();
        assert_eq!(block_on(sonar.distance(Centimeters)), -1);
        assert_eq!(block_on(sonar.distance(Inches)), -1);
        assert!(!block_on(sonar.is_closer_than(50, Centimeters)));
        assert!(!block_on(sonar.is_closer_than(-5, Centimeters)));
    }

    #[test]
    fn test_nonpositive_watch_distance_ignored() {
        let sonar: Sonar<NoopRawMutex> = Sonar::new();
        sonar.on_object_detected(0, Centimeters, || {});
        sonar.on_object_detected(-5, Centimeters, || {});
        // No state was primed
        assert_eq!(block_on(sonar.distance(Centimeters)), -1);
    }

    #[test]
    fn test_oversized_watch_distance_is_accepted() {
        let sonar: Sonar<NoopRawMutex> = Sonar::new();
        // Threshold math saturates; the watch simply always matches
        sonar.on_object_detected(i32::MAX, Inches, || {});
        assert_eq!(block_on(sonar.distance(Centimeters)), 300);
        assert!(block_on(sonar.is_closer_than(i32::MAX, Centimeters)));
    }

    #[test]
    fn test_registration_primes_the_state() {
        let sonar: Sonar<NoopRawMutex> = Sonar::new();
        sonar.on_object_detected(20, Centimeters, || {});
        // Primed but no echoes yet: reads as max range
        assert_eq!(block_on(sonar.distance(Centimeters)), 300);
        assert_eq!(block_on(sonar.distance(Inches)), 117);
        assert!(!block_on(sonar.is_closer_than(300, Centimeters)));
        assert!(block_on(sonar.is_closer_than(301, Centimeters)));
    }

    #[test]
    fn test_trigger_pulse_shape() {
        let (sonar, clock, log) = fixture();
        let mut trig = RecordingPin::new(&log);
        let mut delay = FakeDelay::new(&clock, &sonar, u32::MAX);
        delay.log = Some(&log);

        block_on(trigger_pulse(&mut trig, &mut delay));

        assert_eq!(
            log.borrow().as_slice(),
            &[
                Event::Low,
                Event::DelayNs(2_000),
                Event::High,
                Event::DelayNs(10_000),
                Event::Low,
            ]
        );
    }

    static DETECTIONS: AtomicUsize = AtomicUsize::new(0);

    fn count_detection() {
        DETECTIONS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_run_fires_watch_once_and_reads_distance() {
        let (sonar, clock, log) = fixture();
        sonar.on_object_detected(20, Centimeters, count_detection);

        let trig = RecordingPin::new(&log);
        // Three clean echoes at 20 cm
        let echo = ScriptedEcho::new(&[1160, 1160, 1160]);
        let delay = FakeDelay::new(&clock, &sonar, 5);

        block_on(sonar.run(trig, echo, delay, &clock));

        assert_eq!(DETECTIONS.load(Ordering::Relaxed), 1);
        assert_eq!(block_on(sonar.distance(Centimeters)), 20);
        assert!(block_on(sonar.is_closer_than(25, Centimeters)));
        // One trigger (three pin edges) per cycle
        assert_eq!(log.borrow().len(), 3 * 5);
    }

    #[test]
    fn test_reading_decays_to_max_range_when_echoes_stop() {
        let (sonar, clock, log) = fixture();
        sonar.on_object_detected(5, Centimeters, || {});

        let trig = RecordingPin::new(&log);
        let echo = ScriptedEcho::new(&[580, 580, 580]);
        // Enough idle cycles for timeout samples to take the window over
        let delay = FakeDelay::new(&clock, &sonar, 16);

        block_on(sonar.run(trig, echo, delay, &clock));

        assert_eq!(block_on(sonar.distance(Centimeters)), 300);
        assert!(!block_on(sonar.is_closer_than(10, Centimeters)));
    }

    #[test]
    fn test_stop_before_run_cancels_after_one_cycle() {
        let (sonar, clock, log) = fixture();
        sonar.stop();

        let trig = RecordingPin::new(&log);
        let echo = ScriptedEcho::new(&[]);
        let delay = FakeDelay::new(&clock, &sonar, u32::MAX);

        block_on(sonar.run(trig, echo, delay, &clock));

        // Exactly one trigger went out before the stop was observed
        assert_eq!(log.borrow().len(), 3);
        // Connecting primed the state even with no watches
        assert_eq!(block_on(sonar.distance(Centimeters)), 300);
    }

    #[test]
    fn test_second_run_returns_immediately() {
        let (sonar, clock, log) = fixture();
        let second_log = RefCell::new(Vec::new());

        let trig = RecordingPin::new(&log);
        let echo = ScriptedEcho::new(&[]);
        let delay = FakeDelay::new(&clock, &sonar, 3);

        let second_trig = RecordingPin::new(&second_log);
        let second_echo = ScriptedEcho::new(&[]);
        let second_delay = FakeDelay::new(&clock, &sonar, u32::MAX);

        block_on(join(
            sonar.run(trig, echo, delay, &clock),
            sonar.run(second_trig, second_echo, second_delay, &clock),
        ));

        assert!(!log.borrow().is_empty());
        assert!(second_log.borrow().is_empty());
    }
}
