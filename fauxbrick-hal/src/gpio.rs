//! Raw line-level access for connection setup
//!
//! Before the UART handshake, the device watches the hub's TX line (our
//! RX) for a sustained idle level and then pulses its own TX line to
//! announce itself. Both happen with the UART peripheral stopped, so the
//! pins are driven as plain GPIO.

/// Raw levels of the serial lines while the UART is stopped
///
/// Only used for idle detection and the wake pulse; once the UART is
/// running again these methods are not called.
pub trait LinePins {
    /// Sample the RX line; true while the hub holds it low
    fn rx_is_low(&mut self) -> bool;

    /// Drive the TX line high or low
    fn set_tx(&mut self, high: bool);
}
