//! Powered Up device profiles
//!
//! Four devices the engine can masquerade as:
//!
//! - [`ColorDistanceSensor`]: the Boost color & distance sensor
//!   (type `0x25`, 10 modes, extended-mode default response)
//! - [`ColorSensor`]: the Spike/Technic color sensor
//!   (type `0x3D`, combo-mode support)
//! - [`ForceSensor`]: the Spike/Technic force sensor
//!   (type `0x3F`, combo-mode support, calibration readback)
//! - [`TiltSensor`]: the WeDo 2.0 tilt sensor
//!   (type `0x22`, the minimal single-mode case)
//!
//! Each profile is a plain struct owning its sensor values; the embedding
//! application updates them between engine polls and registers plain-`fn`
//! callbacks for the values the hub can write. The descriptor sequences
//! are fixed byte tables with their checksums embedded - the hub
//! validates them, so they are reproduced verbatim.

#![no_std]
#![deny(unsafe_code)]

pub mod color;
pub mod color_distance;
pub mod colors;
pub mod force;
pub mod tilt;

pub use color::ColorSensor;
pub use color_distance::ColorDistanceSensor;
pub use colors::Color;
pub use force::ForceSensor;
pub use tilt::TiltSensor;

#[cfg(test)]
pub(crate) mod testing {
    use fauxbrick_core::InitBlock;
    use fauxbrick_protocol::checksum;

    /// Every multi-byte descriptor chunk must re-checksum to its own
    /// trailing byte
    pub fn assert_init_chunks_sealed(blocks: &[InitBlock]) {
        for block in blocks {
            for chunk in block.chunks {
                if chunk.len() > 1 {
                    assert_eq!(
                        checksum(&chunk[..chunk.len() - 1]),
                        chunk[chunk.len() - 1],
                        "bad embedded checksum in {:02X?}",
                        chunk
                    );
                }
            }
        }
    }
}
