//! Hardware abstraction traits for Fauxbrick
//!
//! The protocol engine talks to the hub over a single half-duplex serial
//! wire whose baud rate changes mid-session, and which is driven as a raw
//! GPIO line during connection setup. These traits capture exactly that
//! surface so the engine stays board-agnostic:
//!
//! - [`SerialPort`]: byte-level UART access with runtime re-speeding
//! - [`LinePins`]: raw line levels while the UART is stopped
//! - [`Transport`]: the combination the engine is generic over
//! - [`Clock`]: millisecond time source and blocking delay
//!
//! The `mock` feature provides a deterministic simulated implementation
//! used by the engine and device tests.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod serial;
pub mod time;

#[cfg(feature = "mock")]
pub mod mock;

pub use gpio::LinePins;
pub use serial::{SerialPort, Transport};
pub use time::Clock;
