//! Header byte encoding and decoding
//!
//! A LUMP header packs `{msg_type:2, size_class:3, mode_or_cmd:3}` into a
//! single byte. The size class encodes the padded payload length as a
//! power of two (1, 2, 4, 8, 16 or 32 bytes); payloads that are not a
//! power of two are zero-padded up to the next class by the sender.

/// Bit mask for the message type field
pub const MSG_TYPE_MASK: u8 = 0xC0;

/// Bit mask for the size class field
pub const MSG_SIZE_MASK: u8 = 0x38;

/// Bit mask for the mode / command field
pub const MSG_CMD_MASK: u8 = 0x07;

/// Message type field values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MsgType {
    /// Single-byte system messages (NACK, ACK); no payload, no checksum
    Sys = 0 << 6,
    /// Commands (type id, modes, speed, select, write, ext mode, version)
    Cmd = 1 << 6,
    /// Mode descriptor blocks sent during the handshake
    Info = 2 << 6,
    /// Mode data, in either direction
    Data = 3 << 6,
}

// Size class values (pre-shifted into header position)
pub const SIZE_1: u8 = 0 << 3;
pub const SIZE_2: u8 = 1 << 3;
pub const SIZE_4: u8 = 2 << 3;
pub const SIZE_8: u8 = 3 << 3;
pub const SIZE_16: u8 = 4 << 3;
pub const SIZE_32: u8 = 5 << 3;

/// The hub's periodic keep-alive poll; also the device's cue to send
/// its default data frame
pub const NACK: u8 = 0x02;

/// Handshake acknowledgement / end-of-descriptors marker
pub const ACK: u8 = 0x04;

/// Hub "get value" query header (CMD | SELECT, 1-byte payload)
pub const HEADER_GET_VALUE: u8 = 0x43;

/// Extended-mode message header (CMD | EXT_MODE, 1-byte payload)
///
/// Sent by the hub as the first part of every write query, and by the
/// device as the extended-mode-info frame preceding mode >= 8 data.
pub const HEADER_EXT_MODE: u8 = 0x46;

/// Hub combo-mode reset header (CMD | WRITE, 2-byte payload)
pub const HEADER_COMBO_RESET: u8 = 0x4C;

/// Hub combo-mode select header (CMD | WRITE, 8-byte payload)
pub const HEADER_COMBO_SET: u8 = 0x5C;

/// Extended-mode flag carried in `HEADER_EXT_MODE` payloads
///
/// The mode field of a data header only has 3 bits; modes 8 and up are
/// addressed by sending their low 3 bits together with this flag in a
/// preceding extended-mode message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtMode {
    /// Modes 0-7
    #[default]
    Mode0,
    /// Modes 8 and up
    Mode8,
}

impl ExtMode {
    /// The flag a given mode number must be announced with
    pub fn for_mode(mode: u8) -> Self {
        if mode < 8 {
            ExtMode::Mode0
        } else {
            ExtMode::Mode8
        }
    }

    /// Parse the flag from an extended-mode message payload byte
    pub fn from_byte(byte: u8) -> Self {
        if byte & 0x08 != 0 {
            ExtMode::Mode8
        } else {
            ExtMode::Mode0
        }
    }

    /// Wire value for an extended-mode message payload
    pub fn to_byte(self) -> u8 {
        match self {
            ExtMode::Mode0 => 0x00,
            ExtMode::Mode8 => 0x08,
        }
    }
}

/// Build a header byte the way the original firmware does
///
/// `msg_size` is multiplied by 3 before masking; this protocol-specific
/// constant makes the size-class bits come out right for the sizes the
/// devices actually transmit (pass 1 for single-byte payloads, or the
/// total message size for 2/4/8-byte payloads). It silently mis-encodes
/// 16- and 32-byte payloads - use [`data_header`] for those.
pub fn encode_header(msg_type: MsgType, mode_or_cmd: u8, msg_size: u8) -> u8 {
    (msg_type as u8 & MSG_TYPE_MASK)
        | (mode_or_cmd & MSG_CMD_MASK)
        | (msg_size.wrapping_mul(3) & MSG_SIZE_MASK)
}

/// Size class for a padded payload length
///
/// `payload_len` must be one of 1, 2, 4, 8, 16, 32.
pub fn size_class(payload_len: u8) -> u8 {
    debug_assert!(
        matches!(payload_len, 1 | 2 | 4 | 8 | 16 | 32),
        "payload length must be a power of two up to 32"
    );
    match payload_len {
        1 => SIZE_1,
        2 => SIZE_2,
        4 => SIZE_4,
        8 => SIZE_8,
        16 => SIZE_16,
        _ => SIZE_32,
    }
}

/// Header for a data frame carrying `payload_len` padded payload bytes
///
/// Modes >= 8 wrap around into the 3-bit field; the extended-mode flag
/// sent beforehand disambiguates them on the hub side.
pub fn data_header(mode: u8, payload_len: u8) -> u8 {
    MsgType::Data as u8 | (mode & MSG_CMD_MASK) | size_class(payload_len)
}

/// Split a data header into its mode and total message size
///
/// Total size counts header, padded payload and checksum. Valid for
/// data-class headers only; SYS messages have no size field and INFO
/// messages carry one extra byte this formula does not account for.
pub fn decode_header(header: u8) -> (u8, usize) {
    let mode = header & MSG_CMD_MASK;
    let total = (1usize << ((header >> 3) & 0x7)) + 2;
    (mode, total)
}
