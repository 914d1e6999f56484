//! Ultrasonic ranging logic
//!
//! Pure, synchronous state for the background-sampled distance sensor:
//!
//! - [`window::RoundTripWindow`] - bounded, time-ordered buffer of recent
//!   round-trip samples
//! - [`median::lower_median`] - robust round-trip estimate
//! - [`watch::WatchRegistry`] - edge-triggered proximity thresholds
//! - [`state::RangingState`] - one struct tying the above together, updated
//!   once per sampling cycle
//!
//! The driving loop (trigger pulses, echo capture, cadence) lives in
//! `robokit-drivers`; everything here is host-testable.

pub mod median;
pub mod state;
pub mod watch;
pub mod window;

pub use median::lower_median;
pub use state::RangingState;
pub use watch::{WatchRegistry, WatchState, MAX_WATCHES};
pub use window::{RoundTrip, RoundTripWindow, WINDOW_SIZE};
