//! PWM channel bank abstraction
//!
//! The driver board exposes a bank of PWM channels (a PCA9685 or similar)
//! that motors, servos and steppers are wired to. The bank is programmed
//! per channel with 12-bit on/off tick counts within the PWM frame.
//!
//! Frequency and prescaler programming is the platform's job and happens
//! before any driver touches the bank; drivers only issue per-channel
//! writes.

/// Number of channels on the board's PWM device
pub const PWM_CHANNEL_COUNT: u8 = 16;

/// A bank of PWM output channels
///
/// Implementations translate the on/off tick counts into the device's
/// register writes. Writes to channels outside `0..PWM_CHANNEL_COUNT`
/// must be ignored.
pub trait PwmChannels {
    /// Program one channel's on and off tick counts (0..=4095)
    fn set_channel(&mut self, channel: u8, on_ticks: u16, off_ticks: u16);

    /// Drive a channel fully off
    fn clear_channel(&mut self, channel: u8) {
        self.set_channel(channel, 0, 0);
    }
}

impl<P: PwmChannels + ?Sized> PwmChannels for &mut P {
    fn set_channel(&mut self, channel: u8, on_ticks: u16, off_ticks: u16) {
        P::set_channel(self, channel, on_ticks, off_ticks);
    }
}
