//! Board-agnostic core logic for the Robokit driver board extension
//!
//! This crate contains all logic that does not depend on hardware
//! implementations:
//!
//! - Distance units and round-trip-time conversion constants
//! - The ultrasonic ranging state: round-trip window, median estimator
//!   and threshold watch registry
//! - Mecanum drive kinematics (wheel speed mixing)
//!
//! The async sampling loop and the PWM-backed drivers that feed this
//! logic live in `robokit-drivers`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod kinematics;
pub mod ranging;
pub mod units;
