//! Echo pulse capture abstraction

/// Edge-triggered pulse duration measurement on a digital input
///
/// The platform measures the duration of high pulses on the echo line
/// (typically via edge interrupts and a capture timer). Each call waits
/// for the next complete pulse; the measurement re-arms itself, so
/// callers can simply await in a loop.
pub trait PulseCapture {
    /// Wait for the next high pulse and return its duration in microseconds
    #[allow(async_fn_in_trait)]
    async fn next_pulse_us(&mut self) -> u32;
}
