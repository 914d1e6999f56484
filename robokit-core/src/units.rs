//! Distance units and round-trip-time conversions
//!
//! Ultrasonic distance is measured as the round-trip time of a sound
//! pulse. The per-unit constants are the wire contract between distance
//! values and raw microseconds: 58 µs of round trip per centimeter and
//! 148 µs per inch (343 m/s at sea level and 20 °C).

/// Maximum supported range in centimeters
pub const MAX_RANGE_CM: u32 = 300;

/// Round-trip time for the maximum supported range
///
/// Any echo at or beyond this is indistinguishable from "no object";
/// it doubles as the sentinel value for "nothing detected".
pub const MAX_TRAVEL_TIME_US: u32 = MAX_RANGE_CM * 58;

/// Unit for distance values exposed by the sonar API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceUnit {
    Centimeters,
    Inches,
}

impl DistanceUnit {
    /// Round-trip microseconds per one unit of distance
    pub const fn travel_time_per_unit_us(self) -> u32 {
        match self {
            DistanceUnit::Centimeters => 58,
            DistanceUnit::Inches => 148,
        }
    }

    /// Convert a distance in this unit to a round-trip-time threshold
    ///
    /// Saturates, so an oversized distance pins to a threshold that is
    /// always in range rather than wrapping.
    pub const fn threshold_us(self, distance: u32) -> u32 {
        distance.saturating_mul(self.travel_time_per_unit_us())
    }

    /// Convert a round-trip time to a distance in this unit
    ///
    /// Integer division; the result is truncated, never rounded.
    pub const fn distance_from_travel_time(self, travel_time_us: u32) -> u32 {
        travel_time_us / self.travel_time_per_unit_us()
    }
}
