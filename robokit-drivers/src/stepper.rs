//! Stepper motor driver
//!
//! The board runs 28BYJ-48 geared steppers on the same H-bridge channels
//! as the first two DC motor pairs. Stepping is done in hardware by
//! phase-shifted PWM waveforms on the four half-bridges; the driver only
//! chooses the phase pattern (direction), holds it for the time a turn
//! takes, and releases the coils.

use embedded_hal_async::delay::DelayNs;

use robokit_core::kinematics::{stepper_travel_ms, stepper_turn_ms};
use robokit_hal::PwmChannels;

/// Stepper sockets, sharing PWM channels 0..=3 and 4..=7 with the motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stepper {
    M1,
    M2,
}

impl Stepper {
    const fn base_channel(self) -> u8 {
        match self {
            Stepper::M1 => 0,
            Stepper::M2 => 4,
        }
    }
}

/// Common turn amounts, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Turns {
    Quarter = 90,
    Half = 180,
    Full = 360,
    Double = 720,
    Triple = 1080,
    Quadruple = 1440,
    Quintuple = 1800,
}

/// Time for one full output-shaft revolution at the fixed step rate
const MS_PER_REVOLUTION: u64 = 10_240;

/// The four phase waveforms, as (on, off) tick counts
const PHASES: [(u16, u16); 4] = [(2047, 4095), (1, 2047), (1023, 3071), (3071, 1023)];

/// Channel offsets the phases land on, per direction
const CLOCKWISE: [u8; 4] = [0, 2, 1, 3];
const COUNTER_CLOCKWISE: [u8; 4] = [3, 1, 2, 0];

/// Stepper control over a PWM channel bank
pub struct StepperBank<P: PwmChannels> {
    pwm: P,
}

impl<P: PwmChannels> StepperBank<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Apply the phase pattern for the given direction
    pub fn energize(&mut self, stepper: Stepper, clockwise: bool) {
        let base = stepper.base_channel();
        let offsets = if clockwise { CLOCKWISE } else { COUNTER_CLOCKWISE };
        for (offset, (on, off)) in offsets.iter().zip(PHASES) {
            self.pwm.set_channel(base + offset, on, off);
        }
    }

    /// Cut all four coils of a stepper
    pub fn release(&mut self, stepper: Stepper) {
        let base = stepper.base_channel();
        for offset in 0..4 {
            self.pwm.clear_channel(base + offset);
        }
    }

    /// Turn by a signed angle, blocking this task for the duration
    ///
    /// Positive angles turn clockwise. The coils are released afterwards
    /// so the shared motor channels are left quiet.
    pub async fn turn_degrees<D: DelayNs>(
        &mut self,
        stepper: Stepper,
        degrees: i32,
        delay: &mut D,
    ) {
        if degrees == 0 {
            return;
        }
        self.energize(stepper, degrees > 0);
        let duration_ms = MS_PER_REVOLUTION * u64::from(degrees.unsigned_abs()) / 360;
        delay.delay_ms(duration_ms as u32).await;
        self.release(stepper);
    }

    /// Turn by a whole number of common turn amounts
    pub async fn turn<D: DelayNs>(&mut self, stepper: Stepper, turns: Turns, delay: &mut D) {
        self.turn_degrees(stepper, turns as i32, delay).await;
    }

    /// Drive a two-stepper car straight by a physical distance
    ///
    /// Both steppers run the same way for the time the distance takes on
    /// wheels of the given diameter, then release. Negative distances
    /// drive in reverse.
    pub async fn drive_straight<D: DelayNs>(
        &mut self,
        distance_cm: i32,
        wheel_diameter_mm: u32,
        delay: &mut D,
    ) {
        let hold_ms = stepper_travel_ms(distance_cm, wheel_diameter_mm);
        if hold_ms == 0 {
            return;
        }
        let forward = hold_ms > 0;
        self.energize(Stepper::M1, forward);
        self.energize(Stepper::M2, forward);
        self.hold_and_release(hold_ms, delay).await;
    }

    /// Turn a two-stepper car in place by an angle
    ///
    /// The steppers run opposed for the time the arc takes given the
    /// wheel diameter and track width, then release.
    pub async fn turn_in_place<D: DelayNs>(
        &mut self,
        degrees: i32,
        wheel_diameter_mm: u32,
        track_mm: u32,
        delay: &mut D,
    ) {
        let hold_ms = stepper_turn_ms(degrees, wheel_diameter_mm, track_mm);
        if hold_ms == 0 {
            return;
        }
        self.energize(Stepper::M1, hold_ms < 0);
        self.energize(Stepper::M2, hold_ms > 0);
        self.hold_and_release(hold_ms, delay).await;
    }

    async fn hold_and_release<D: DelayNs>(&mut self, hold_ms: i64, delay: &mut D) {
        let hold_ms = hold_ms.unsigned_abs().min(u64::from(u32::MAX)) as u32;
        delay.delay_ms(hold_ms).await;
        self.release(Stepper::M1);
        self.release(Stepper::M2);
    }
}
