//! Half-duplex serial port abstraction
//!
//! Provides the byte-level UART surface the protocol engine needs. The
//! LEGO wire starts at 2400 baud for the descriptor handshake and is
//! re-opened at 115200 baud once the hub acknowledges, so implementations
//! must support stopping and restarting the peripheral at a new speed.

use crate::gpio::LinePins;

/// Byte-level serial access with runtime re-speeding
///
/// All operations are infallible by contract: transport-level errors are
/// expressed as short reads, which the protocol treats as a truncated
/// frame and drops locally.
pub trait SerialPort {
    /// Start (or restart) the UART at the given baud rate
    fn begin(&mut self, baud: u32);

    /// Stop the UART, releasing the pins for raw line access
    fn end(&mut self);

    /// Number of received bytes ready to read
    fn available(&mut self) -> usize;

    /// Read a single byte, if one is ready
    fn read(&mut self) -> Option<u8>;

    /// Read up to `buf.len()` bytes, bounded by the transport's own
    /// read timeout
    ///
    /// Returns the number of bytes actually read. A short count means the
    /// remaining bytes did not arrive in time.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Queue bytes for transmission
    fn write(&mut self, data: &[u8]);

    /// Block until all queued bytes are on the wire
    fn flush(&mut self);
}

/// Combined transport: serial port plus raw line control
///
/// The engine is generic over a single transport type; connection setup
/// needs the raw line levels (idle detection, wake pulse) and everything
/// after runs through the serial port.
pub trait Transport: SerialPort + LinePins {}

// Blanket implementation
impl<T: SerialPort + LinePins> Transport for T {}
