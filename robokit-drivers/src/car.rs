//! Mecanum car driver
//!
//! Thin layer over the motor bank that turns [`Maneuver`]s into wheel
//! speeds via the kinematics in `robokit-core`. Per-side base speeds and
//! trim are configuration; all mixing lives in the core crate where it
//! is tested in isolation.

use embedded_hal_async::delay::DelayNs;

use robokit_core::kinematics::{wheel_speeds, DriveTrim, Maneuver};
use robokit_hal::PwmChannels;

use crate::motor::{Motor, MotorBank, MAX_SPEED};

/// Base speeds per side, in the motor range `0..=255`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CarConfig {
    pub right_speed: i16,
    pub left_speed: i16,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            right_speed: MAX_SPEED,
            left_speed: MAX_SPEED,
        }
    }
}

/// Four-wheel mecanum car on the motor bank
pub struct Car<P: PwmChannels> {
    motors: MotorBank<P>,
    config: CarConfig,
    trim: DriveTrim,
}

impl<P: PwmChannels> Car<P> {
    pub fn new(pwm: P) -> Self {
        Self::with_config(pwm, CarConfig::default())
    }

    pub fn with_config(pwm: P, config: CarConfig) -> Self {
        Self {
            motors: MotorBank::new(pwm),
            config,
            trim: DriveTrim::default(),
        }
    }

    /// Set per-side trim to straighten a pulling car
    pub fn set_trim(&mut self, trim: DriveTrim) {
        self.trim = trim;
    }

    /// Start a maneuver; the wheels keep turning until another call
    pub fn maneuver(&mut self, maneuver: Maneuver) {
        let speeds = wheel_speeds(
            maneuver,
            self.config.right_speed,
            self.config.left_speed,
            self.trim,
        );
        for (motor, speed) in Motor::ALL.into_iter().zip(speeds) {
            self.motors.run(motor, speed);
        }
    }

    /// Run a maneuver for a fixed time, then stop all wheels
    pub async fn maneuver_for<D: DelayNs>(
        &mut self,
        maneuver: Maneuver,
        duration_ms: u32,
        delay: &mut D,
    ) {
        self.maneuver(maneuver);
        delay.delay_ms(duration_ms).await;
        self.halt();
    }

    pub fn halt(&mut self) {
        self.motors.stop_all();
    }
}
