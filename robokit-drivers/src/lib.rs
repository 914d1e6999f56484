//! Device drivers for the Robokit driver board
//!
//! This crate provides drivers generic over the `robokit-hal` traits:
//!
//! - Ultrasonic ranger with background sampling loop and query facade
//! - DC motor bank (PWM channel pairs)
//! - Servo bank (pulse-width mapping)
//! - Stepper motors (28BYJ-48 phase sequencing)
//! - Mecanum car on top of the motor bank

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod car;
pub mod motor;
pub mod servo;
pub mod sonar;
pub mod stepper;

#[cfg(test)]
mod test_util;
