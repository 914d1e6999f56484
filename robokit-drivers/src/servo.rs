//! Servo bank driver
//!
//! Hobby servos sit on the upper PWM channels and are positioned by
//! pulse width: 600 µs at 0° up to 2400 µs at 180°, inside the 20 ms
//! frame of a 50 Hz PWM clock.

use robokit_hal::PwmChannels;

/// Servo headers on the driver board, wired to PWM channels 8..=15
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Servo {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
}

impl Servo {
    const fn channel(self) -> u8 {
        8 + self as u8
    }
}

/// Off-tick count for a servo angle, clamped to `0..=180` degrees
///
/// Maps the angle onto a 600..=2400 µs pulse and converts to 12-bit
/// ticks of the 20 ms frame.
const fn pulse_ticks(degrees: u8) -> u16 {
    let degrees = if degrees > 180 { 180 } else { degrees } as u32;
    let pulse_us = degrees * 1800 / 180 + 600;
    (pulse_us * 4096 / 20_000) as u16
}

/// The eight-servo bank on PWM channels 8..=15
pub struct ServoBank<P: PwmChannels> {
    pwm: P,
}

impl<P: PwmChannels> ServoBank<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Move a servo to an absolute angle in degrees
    pub fn set_degrees(&mut self, servo: Servo, degrees: u8) {
        self.pwm.set_channel(servo.channel(), 0, pulse_ticks(degrees));
    }

    /// Stop driving a servo, leaving the horn free to move
    pub fn release(&mut self, servo: Servo) {
        self.pwm.clear_channel(servo.channel());
    }
}
