//! Robokit Hardware Abstraction Layer
//!
//! This crate defines the trait seams between the driver-board logic and
//! the platform it runs on. The drivers in `robokit-drivers` are generic
//! over these traits, so the same code runs against a real board or
//! against test doubles on the host.
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (sonar trigger line)
//! - [`pwm::PwmChannels`] - Per-channel on/off writes on the board's PWM device
//! - [`pulse::PulseCapture`] - Echo pulse duration measurement
//! - [`time::Clock`] - Free-running monotonic clock

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pulse;
pub mod pwm;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use pulse::PulseCapture;
pub use pwm::PwmChannels;
pub use time::Clock;
