//! Drive kinematics
//!
//! The driver board runs four mecanum wheels as two side pairs:
//! `M1A`/`M1B` on the right, `M2A`/`M2B` on the left. Maneuvers are
//! fixed wheel-speed mixes of a per-side base speed; per-side trim is
//! subtracted from the base to compensate for motor mismatch.
//!
//! The stepper-car variant drives two steppers at a fixed step rate
//! instead, so its motion is distance-over-time math: the functions at
//! the bottom convert physical geometry (wheel diameter, track width)
//! into hold times for the stepper driver.

/// Wheel order used throughout: `[M1A, M1B, M2A, M2B]`
pub type WheelSpeeds = [i16; 4];

/// Drive maneuvers supported by the board's car mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Maneuver {
    Forward,
    Reverse,
    /// Right side only; the car curves toward the left
    CurveLeft,
    /// Left side only; the car curves toward the right
    CurveRight,
    /// Sides opposed, turning in place
    SpinLeft,
    SpinRight,
    /// One wheel per side; the car slides diagonally
    DiagonalForwardLeft,
    DiagonalForwardRight,
    DiagonalReverseLeft,
    DiagonalReverseRight,
    /// Diagonal wheel pairs opposed; the car slides sideways
    StrafeLeft,
    StrafeRight,
}

/// Per-side trim subtracted from the base speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveTrim {
    pub right: i16,
    pub left: i16,
}

/// Wheel speeds for a maneuver at the given per-side base speeds
///
/// Base speeds are in the motor range 0..=255; trim saturates at zero
/// rather than reversing a wheel.
pub fn wheel_speeds(
    maneuver: Maneuver,
    right_speed: i16,
    left_speed: i16,
    trim: DriveTrim,
) -> WheelSpeeds {
    let r = (right_speed - trim.right).max(0);
    let l = (left_speed - trim.left).max(0);

    match maneuver {
        Maneuver::Forward => [r, r, l, l],
        Maneuver::Reverse => [-r, -r, -l, -l],
        Maneuver::CurveLeft => [r, r, 0, 0],
        Maneuver::CurveRight => [0, 0, l, l],
        Maneuver::SpinLeft => [r, r, -l, -l],
        Maneuver::SpinRight => [-r, -r, l, l],
        Maneuver::DiagonalForwardLeft => [r, 0, l, 0],
        Maneuver::DiagonalForwardRight => [0, r, 0, l],
        Maneuver::DiagonalReverseLeft => [0, -r, 0, -l],
        Maneuver::DiagonalReverseRight => [-r, 0, -l, 0],
        Maneuver::StrafeRight => [r, -r, l, -l],
        Maneuver::StrafeLeft => [-r, r, -l, l],
    }
}

/// Hold time for the stepper car to travel `distance_cm`, in milliseconds
///
/// One wheel revolution takes 10 240 ms and covers pi wheel diameters of
/// ground; pi is approximated as 3, matching the board's published
/// timing. Negative distances yield negative times (reverse). A zero
/// diameter yields zero.
pub fn stepper_travel_ms(distance_cm: i32, wheel_diameter_mm: u32) -> i64 {
    if wheel_diameter_mm == 0 {
        return 0;
    }
    let distance_mm = i64::from(distance_cm) * 10;
    10_240 * distance_mm / (3 * i64::from(wheel_diameter_mm))
}

/// Hold time for the stepper car to turn `degrees` in place, in milliseconds
///
/// Each wheel traces an arc of the circle spanned by the track width;
/// the circumference ratio cancels pi, so no approximation is involved.
/// Negative degrees turn the other way. A zero diameter yields zero.
pub fn stepper_turn_ms(degrees: i32, wheel_diameter_mm: u32, track_mm: u32) -> i64 {
    if wheel_diameter_mm == 0 {
        return 0;
    }
    10_240 * i64::from(degrees) * i64::from(track_mm) / (360 * i64::from(wheel_diameter_mm))
}
