//! DC motor bank driver
//!
//! The board drives four brushed DC motors through an H-bridge fed by a
//! pair of PWM channels per motor: one channel per bridge direction.
//! Speed is signed; the sign picks the energized channel and the
//! magnitude its duty.

use robokit_hal::PwmChannels;

/// Motor positions on the driver board
///
/// `M1A`/`M1B` are the right-side pair, `M2A`/`M2B` the left, matching
/// the car wiring in [`crate::car`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motor {
    M1A,
    M1B,
    M2A,
    M2B,
}

impl Motor {
    /// All motors, in the wheel order used by the kinematics
    pub const ALL: [Motor; 4] = [Motor::M1A, Motor::M1B, Motor::M2A, Motor::M2B];

    /// The (forward, reverse) PWM channel pair for this motor
    const fn channel_pair(self) -> (u8, u8) {
        let index = self as u8;
        (index * 2, index * 2 + 1)
    }
}

/// Speed magnitude for full duty
pub const MAX_SPEED: i16 = 255;

/// 12-bit duty for a signed speed in `-255..=255`
///
/// Magnitudes beyond the nominal range clamp to full duty rather than
/// wrapping.
const fn duty_ticks(speed: i16) -> u16 {
    let scaled = speed.unsigned_abs() as u32 * 16;
    if scaled > 4095 {
        4095
    } else {
        scaled as u16
    }
}

/// The four-motor bank on PWM channels 0..=7
pub struct MotorBank<P: PwmChannels> {
    pwm: P,
}

impl<P: PwmChannels> MotorBank<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Run a motor at a signed speed; zero coasts
    pub fn run(&mut self, motor: Motor, speed: i16) {
        let duty = duty_ticks(speed);
        let (forward, reverse) = motor.channel_pair();
        if speed >= 0 {
            self.pwm.set_channel(forward, 0, duty);
            self.pwm.clear_channel(reverse);
        } else {
            self.pwm.clear_channel(forward);
            self.pwm.set_channel(reverse, 0, duty);
        }
    }

    /// Run two motors in one call
    pub fn run_dual(&mut self, first: (Motor, i16), second: (Motor, i16)) {
        self.run(first.0, first.1);
        self.run(second.0, second.1);
    }

    pub fn stop(&mut self, motor: Motor) {
        self.run(motor, 0);
    }

    pub fn stop_all(&mut self) {
        for motor in Motor::ALL {
            self.stop(motor);
        }
    }
}
