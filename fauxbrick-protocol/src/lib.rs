//! LEGO UART Message Protocol (LUMP) codec
//!
//! This crate implements the byte-level message format spoken between a
//! Powered Up hub and its UART devices. Every message is a single header
//! byte, an optional payload, and a trailing XOR checksum:
//!
//! ```text
//! ┌────────┬──────────────┬──────────┐
//! │ HEADER │ PAYLOAD      │ CHECKSUM │
//! │ 1B     │ 1-32B padded │ 1B       │
//! └────────┴──────────────┴──────────┘
//! ```
//!
//! The header packs three bit fields: message type (2 bits), mode or
//! command number (3 bits), and a size class (3 bits) encoding the padded
//! payload length as a power of two. System bytes (NACK `0x02`,
//! ACK `0x04`) are bare single bytes with neither payload nor checksum.
//!
//! Only encoding/decoding lives here; connection state and mode dispatch
//! are in `fauxbrick-core`.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod header;

pub use frame::{checksum, seal_frame, CHECKSUM_SEED, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use header::{
    data_header, decode_header, encode_header, ExtMode, MsgType, ACK, HEADER_COMBO_RESET,
    HEADER_COMBO_SET, HEADER_EXT_MODE, HEADER_GET_VALUE, NACK,
};
