//! WeDo 2.0 Tilt sensor profile (type `0x22`)
//!
//! The minimal case: a single served mode reporting the X and Y tilt
//! angles as signed bytes. Handy as a handshake smoke test against a
//! real hub.

use fauxbrick_core::{DeviceProfile, InitBlock, ModeInfo};

const MODE_ANGLE: u8 = 0; // read: X/roll and Y/pitch angles

const MODES: &[ModeInfo] = &[ModeInfo::read(MODE_ANGLE, 2, 2)];

const INIT: &[InitBlock] = &[
    InitBlock {
        chunks: &[
            // Type ID: 0x22
            &[0x40, 0x22, 0x9D],
            // CMD_MODES: 4 modes, 3 views
            &[0x49, 0x03, 0x02, 0xB7],
            // CMD_SPEED: 115200
            &[0x52, 0x00, 0xC2, 0x01, 0x00, 0x6E],
            // CMD_VERSION: fw 1.0.0.0, hw 1.0.0.0
            &[0x5F, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0xA0],
        ],
        delay_ms: 0,
    },
    // Mode 3: "LPF2-CAL"
    InitBlock {
        chunks: &[
            &[0x9B, 0x00, 0x4C, 0x50, 0x46, 0x32, 0x2D, 0x43, 0x41, 0x4C, 0x6F],
            // Range: -45 to 45
            &[0x9B, 0x01, 0x00, 0x00, 0x34, 0xC2, 0x00, 0x00, 0x34, 0x42, 0xE5],
            // PCT range: -100 to 100
            &[0x9B, 0x02, 0x00, 0x00, 0xC8, 0xC2, 0x00, 0x00, 0xC8, 0x42, 0xE6],
            // SI range: -45 to 45
            &[0x9B, 0x03, 0x00, 0x00, 0x34, 0xC2, 0x00, 0x00, 0x34, 0x42, 0xE7],
            // SI symbol: "CAL"
            &[0x93, 0x04, 0x43, 0x41, 0x4C, 0x00, 0x26],
            // Mapping: absolute in, nothing out
            &[0x8B, 0x05, 0x10, 0x00, 0x61],
            // Format: 3x int8, 3 chars, 0 decimals
            &[0x93, 0x80, 0x03, 0x00, 0x03, 0x00, 0xEC],
        ],
        delay_ms: 0,
    },
    // Mode 2: "LPF2-CRASH"
    InitBlock {
        chunks: &[
            &[
                0xA2, 0x00, 0x4C, 0x50, 0x46, 0x32, 0x2D, 0x43, 0x52, 0x41, 0x53, 0x48, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x53,
            ],
            &[0x9A, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x9A, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x9A, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x92, 0x04, 0x43, 0x4E, 0x54, 0x00, 0x30],
            &[0x8A, 0x05, 0x10, 0x00, 0x60],
            &[0x92, 0x80, 0x03, 0x00, 0x03, 0x00, 0xED],
        ],
        delay_ms: 0,
    },
    // Mode 1: "LPF2-TILT"
    InitBlock {
        chunks: &[
            &[
                0xA1, 0x00, 0x4C, 0x50, 0x46, 0x32, 0x2D, 0x54, 0x49, 0x4C, 0x54, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x1E,
            ],
            &[0x99, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x06],
            &[0x99, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x99, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x04],
            &[0x91, 0x04, 0x44, 0x49, 0x52, 0x00, 0x35],
            &[0x89, 0x05, 0x04, 0x00, 0x77],
            &[0x91, 0x80, 0x01, 0x00, 0x02, 0x00, 0xED],
        ],
        delay_ms: 0,
    },
    // Mode 0: "LPF2-ANGLE"
    InitBlock {
        chunks: &[
            &[
                0xA0, 0x00, 0x4C, 0x50, 0x46, 0x32, 0x2D, 0x41, 0x4E, 0x47, 0x4C, 0x45, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x5B,
            ],
            &[0x98, 0x01, 0x00, 0x00, 0x34, 0xC2, 0x00, 0x00, 0x34, 0x42, 0xE6],
            &[0x98, 0x02, 0x00, 0x00, 0xC8, 0xC2, 0x00, 0x00, 0xC8, 0x42, 0xE5],
            &[0x98, 0x03, 0x00, 0x00, 0x34, 0xC2, 0x00, 0x00, 0x34, 0x42, 0xE4],
            // SI symbol: "DEG"
            &[0x90, 0x04, 0x44, 0x45, 0x47, 0x00, 0x2D],
            &[0x88, 0x05, 0x10, 0x00, 0x62],
            // Format: 2x int8, 3 chars, 0 decimals
            &[0x90, 0x80, 0x02, 0x00, 0x03, 0x00, 0xEE],
        ],
        delay_ms: 0,
    },
    InitBlock {
        chunks: &[&[0x04]],
        delay_ms: 5,
    },
];

/// Tilt sensor bindings
#[derive(Debug, Clone, Copy, Default)]
pub struct TiltSensor {
    /// Rotation around the X axis (roll), in degrees
    pub tilt_x: i8,
    /// Rotation around the Y axis (pitch), in degrees
    pub tilt_y: i8,
}

impl TiltSensor {
    /// Create a level sensor
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceProfile for TiltSensor {
    fn init_sequence(&self) -> &'static [InitBlock] {
        INIT
    }

    fn modes(&self) -> &'static [ModeInfo] {
        MODES
    }

    fn default_mode(&self) -> u8 {
        MODE_ANGLE
    }

    fn read_value(&self, mode: u8, out: &mut [u8]) {
        if mode == MODE_ANGLE {
            out[0] = self.tilt_x as u8;
            out[1] = self.tilt_y as u8;
        }
    }

    fn write_value(&mut self, _mode: u8, _data: &[u8]) {
        // No writable modes
    }
}
