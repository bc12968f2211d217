//! Millisecond time source
//!
//! The protocol's supervision windows (100 ms idle detection, 2000 ms
//! handshake wait, 200 ms liveness) are all counted in milliseconds from
//! an arbitrary epoch, Arduino `millis()` style.

/// Monotonic millisecond clock with a blocking delay
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u64;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);
}
