//! Spike/Technic Force sensor profile (type `0x3F`)
//!
//! Serves the force, touched, tapped, raw-force and calibration-readback
//! modes, plus the hub's combo selection of (force, touched, raw).
//!
//! No complete bus capture of this device's descriptor sequence exists,
//! so the mode descriptors below are a reconstruction with computed
//! checksums: structurally valid LUMP INFO blocks, but not guaranteed to
//! match LEGO's actual tables byte for byte.

use fauxbrick_core::{ComboLayout, DeviceProfile, InitBlock, ModeInfo};

// Mode numbers
const MODE_FORCE: u8 = 0; // read: force, 0.1 N resolution
const MODE_TOUCHED: u8 = 1; // read: pressed past the touch threshold
const MODE_TAPPED: u8 = 2; // read: tap classification 0..3
const MODE_FRAW: u8 = 4; // read: raw force reading
const MODE_CALIB: u8 = 6; // read: calibration slots

const MODES: &[ModeInfo] = &[
    ModeInfo::read(MODE_FORCE, 1, 1),
    ModeInfo::read(MODE_TOUCHED, 1, 1),
    ModeInfo::read(MODE_TAPPED, 1, 1),
    ModeInfo::read(MODE_FRAW, 2, 2),
    ModeInfo::read(MODE_CALIB, 16, 16),
];

/// The one combo selection this profile accepts:
/// force (0,0), touched (1,0), raw (4,0)
const COMBO: ComboLayout = ComboLayout {
    request_echo: &[0x23, 0x00, 0x00, 0x10, 0x40, 0x00, 0x00, 0x00],
    request_checksum: 0xD0,
    wire_len: 4,
};

const INIT: &[InitBlock] = &[
    InitBlock {
        chunks: &[
            // Type ID: 0x3F
            &[0x40, 0x3F, 0x80],
            // CMD_MODES: 7 modes, 7 views; ext: 7 modes, 7 views
            &[0x51, 0x06, 0x06, 0x06, 0x06, 0xAE],
            // CMD_SPEED: 115200
            &[0x52, 0x00, 0xC2, 0x01, 0x00, 0x6E],
            // CMD_VERSION: fw 1.0.0.0, hw 1.0.0.0
            &[0x5F, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0xA0],
        ],
        delay_ms: 10,
    },
    // Mode 6: "CALIB"
    InitBlock {
        chunks: &[
            &[0x9E, 0x00, 0x43, 0x41, 0x4C, 0x49, 0x42, 0x00, 0x00, 0x00, 0x24],
            // Range: 0 to 65535
            &[0x9E, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0xA7],
            // PCT range: 0 to 100
            &[0x9E, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xE9],
            // SI range: 0 to 65535
            &[0x9E, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0xA5],
            // SI symbol: "RAW"
            &[0x96, 0x04, 0x52, 0x41, 0x57, 0x00, 0x29],
            // Mapping: absolute in, nothing out
            &[0x8E, 0x05, 0x10, 0x00, 0x64],
            // Format: 8x int16, 5 chars, 0 decimals
            &[0x96, 0x80, 0x08, 0x01, 0x05, 0x00, 0xE5],
        ],
        delay_ms: 10,
    },
    // Mode 5: "FPRAW"
    InitBlock {
        chunks: &[
            &[0x9D, 0x00, 0x46, 0x50, 0x52, 0x41, 0x57, 0x00, 0x00, 0x00, 0x30],
            &[0x9D, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0x98],
            &[0x9D, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEA],
            &[0x9D, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0x9A],
            &[0x95, 0x04, 0x52, 0x41, 0x57, 0x00, 0x2A],
            &[0x8D, 0x05, 0x10, 0x00, 0x67],
            &[0x95, 0x80, 0x01, 0x01, 0x05, 0x00, 0xEF],
        ],
        delay_ms: 10,
    },
    // Mode 4: "FRAW"
    InitBlock {
        chunks: &[
            &[0x9C, 0x00, 0x46, 0x52, 0x41, 0x57, 0x00, 0x00, 0x00, 0x00, 0x61],
            &[0x9C, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0x99],
            &[0x9C, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEB],
            &[0x9C, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0x9B],
            &[0x94, 0x04, 0x52, 0x41, 0x57, 0x00, 0x2B],
            &[0x8C, 0x05, 0x10, 0x00, 0x66],
            &[0x94, 0x80, 0x01, 0x01, 0x05, 0x00, 0xEE],
        ],
        delay_ms: 10,
    },
    // Mode 3: "FPEAK"
    InitBlock {
        chunks: &[
            &[0x9B, 0x00, 0x46, 0x50, 0x45, 0x41, 0x4B, 0x00, 0x00, 0x00, 0x3D],
            &[0x9B, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            &[0x9B, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x9B, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x06],
            // SI symbol: "N"
            &[0x93, 0x04, 0x4E, 0x00, 0x00, 0x00, 0x26],
            &[0x8B, 0x05, 0x10, 0x00, 0x61],
            // Format: 1x int8, 4 chars, 1 decimal
            &[0x93, 0x80, 0x01, 0x00, 0x04, 0x01, 0xE8],
        ],
        delay_ms: 10,
    },
    // Mode 2: "TAPPED"
    InitBlock {
        chunks: &[
            &[0x9A, 0x00, 0x54, 0x41, 0x50, 0x50, 0x45, 0x44, 0x00, 0x00, 0x71],
            // Range: 0 to 3
            &[0x9A, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x40, 0x64],
            &[0x9A, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x9A, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x40, 0x66],
            &[0x92, 0x04, 0x49, 0x44, 0x58, 0x00, 0x3C],
            // Mapping: discrete in, nothing out
            &[0x8A, 0x05, 0x04, 0x00, 0x74],
            &[0x92, 0x80, 0x01, 0x00, 0x02, 0x00, 0xEE],
        ],
        delay_ms: 10,
    },
    // Mode 1: "TOUCHED"
    InitBlock {
        chunks: &[
            &[0x99, 0x00, 0x54, 0x4F, 0x55, 0x43, 0x48, 0x45, 0x44, 0x00, 0x22],
            // Range: 0 to 1
            &[0x99, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3F, 0xD8],
            &[0x99, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x99, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3F, 0xDA],
            &[0x91, 0x04, 0x49, 0x44, 0x58, 0x00, 0x3F],
            &[0x89, 0x05, 0x04, 0x00, 0x77],
            &[0x91, 0x80, 0x01, 0x00, 0x02, 0x00, 0xED],
        ],
        delay_ms: 10,
    },
    // Mode 0: "FORCE"
    InitBlock {
        chunks: &[
            &[0x98, 0x00, 0x46, 0x4F, 0x52, 0x43, 0x45, 0x00, 0x00, 0x00, 0x3A],
            // Range: 0 to 100 (0.1 N steps)
            &[0x98, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x98, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            // SI range: 0 to 10 N
            &[0x98, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x05],
            // SI symbol: "N"
            &[0x90, 0x04, 0x4E, 0x00, 0x00, 0x00, 0x25],
            &[0x88, 0x05, 0x30, 0x00, 0x42],
            &[0x90, 0x80, 0x01, 0x00, 0x04, 0x01, 0xEB],
            // Combinable modes: force, touched, raw
            &[0x88, 0x06, 0x13, 0x00, 0x62],
        ],
        delay_ms: 10,
    },
    InitBlock {
        chunks: &[&[0x04]],
        delay_ms: 5,
    },
];

// Calibration slot offsets within the 8x u16 readback payload
const CALIB_SLOT_OFFSET: usize = 2;
const CALIB_SLOT_RELEASED: usize = 4;
const CALIB_SLOT_END: usize = 12;

/// Force sensor bindings
#[derive(Debug, Clone)]
pub struct ForceSensor {
    /// Applied force, 0..100 in 0.1 N steps
    pub force: u8,
    /// Pressed past the touch threshold
    pub touched: bool,
    /// Tap classification: 0 none, 1 single, 2 quick, 3 press-and-hold
    pub tapped: u8,
    /// Raw force reading
    pub raw_force: u16,
    raw_offset: u16,
    raw_released: u16,
    raw_end: u16,
}

impl Default for ForceSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSensor {
    /// Create a sensor at rest
    pub fn new() -> Self {
        Self {
            force: 0,
            touched: false,
            tapped: 0,
            raw_force: 0,
            raw_offset: 0,
            raw_released: 0,
            raw_end: 0,
        }
    }

    /// Set the raw calibration values reported by the CALIB mode
    ///
    /// `raw_released` is the reading with nothing pressing the sensor,
    /// `raw_end` the reading at full scale; `raw_released < raw_end`.
    pub fn set_calibration(&mut self, raw_offset: u16, raw_released: u16, raw_end: u16) {
        self.raw_offset = raw_offset;
        self.raw_released = raw_released;
        self.raw_end = raw_end;
    }
}

impl DeviceProfile for ForceSensor {
    fn init_sequence(&self) -> &'static [InitBlock] {
        INIT
    }

    fn modes(&self) -> &'static [ModeInfo] {
        MODES
    }

    fn default_mode(&self) -> u8 {
        MODE_FORCE
    }

    fn combo_layout(&self) -> Option<&'static ComboLayout> {
        Some(&COMBO)
    }

    fn read_value(&self, mode: u8, out: &mut [u8]) {
        match mode {
            MODE_FORCE => out[0] = self.force,
            MODE_TOUCHED => out[0] = self.touched as u8,
            MODE_TAPPED => out[0] = self.tapped,
            MODE_FRAW => out[..2].copy_from_slice(&self.raw_force.to_le_bytes()),
            MODE_CALIB => {
                out[CALIB_SLOT_OFFSET..CALIB_SLOT_OFFSET + 2]
                    .copy_from_slice(&self.raw_offset.to_le_bytes());
                out[CALIB_SLOT_RELEASED..CALIB_SLOT_RELEASED + 2]
                    .copy_from_slice(&self.raw_released.to_le_bytes());
                out[CALIB_SLOT_END..CALIB_SLOT_END + 2]
                    .copy_from_slice(&self.raw_end.to_le_bytes());
            }
            _ => {}
        }
    }

    fn write_value(&mut self, _mode: u8, _data: &[u8]) {
        // No writable modes
    }

    fn compose_combo(&self, out: &mut [u8]) {
        out[0] = self.force;
        out[1] = self.touched as u8;
        out[2..4].copy_from_slice(&self.raw_force.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_init_chunks_sealed;
    use fauxbrick_core::Engine;
    use fauxbrick_hal::mock::{SimBus, SimClock, SimSerial};

    type ForceEngine<'a> = Engine<SimSerial<'a>, SimClock<'a>, ForceSensor>;

    fn connected_engine(bus: &SimBus) -> ForceEngine<'_> {
        let mut engine = Engine::new(bus.serial(), bus.clock(), ForceSensor::new());
        bus.queue_from_hub_at(bus.now() + 600, &[0x04]);
        engine.poll();
        assert!(engine.is_connected());
        bus.take_sent();
        engine
    }

    #[test]
    fn test_init_chunks_are_sealed() {
        assert_init_chunks_sealed(INIT);
    }

    #[test]
    fn test_init_advertises_type_id() {
        assert_eq!(INIT[0].chunks[0], &[0x40, 0x3F, 0x80]);
    }

    #[test]
    fn test_nack_default_is_force_frame() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().force = 0x2A;

        bus.queue_from_hub(&[0x02]);
        engine.poll();

        assert_eq!(bus.take_sent().as_slice(), &[0xC0, 0x2A, 0x15]);
    }

    #[test]
    fn test_get_touched() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().touched = true;

        bus.queue_from_hub(&[0x43, 0x01, 0x00]);
        engine.poll();

        assert_eq!(bus.take_sent().as_slice(), &[0xC1, 0x01, 0x3F]);
    }

    #[test]
    fn test_get_raw_force() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().raw_force = 0x0203;

        bus.queue_from_hub(&[0x43, 0x04, 0x00]);
        engine.poll();

        assert_eq!(bus.take_sent().as_slice(), &[0xCC, 0x03, 0x02, 0x32]);
    }

    #[test]
    fn test_calibration_readback_slots() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine
            .device_mut()
            .set_calibration(0x1111, 0x2222, 0x3333);

        bus.queue_from_hub(&[0x43, 0x06, 0x00]);
        engine.poll();

        let sent = bus.take_sent();
        assert_eq!(sent.len(), 18);
        assert_eq!(sent[0], 0xE6);
        assert_eq!(&sent[3..5], &[0x11, 0x11]);
        assert_eq!(&sent[5..7], &[0x22, 0x22]);
        assert_eq!(&sent[13..15], &[0x33, 0x33]);
        assert_eq!(sent[17], 0x19);
    }

    #[test]
    fn test_combo_selection_switches_nack_response() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        {
            let device = engine.device_mut();
            device.force = 0x2A;
            device.touched = true;
            device.raw_force = 0x0203;
        }

        bus.queue_from_hub(&[0x5C, 0x23, 0x00, 0x00, 0x10, 0x40, 0x00, 0x00, 0x00, 0xD0]);
        engine.poll();
        assert!(engine.combo_active());
        assert_eq!(
            bus.take_sent().as_slice(),
            &[0x5C, 0x23, 0x00, 0x00, 0x10, 0x40, 0x00, 0x00, 0x00, 0xD0]
        );

        bus.queue_from_hub(&[0x02]);
        engine.poll();
        assert_eq!(
            bus.take_sent().as_slice(),
            &[0xD0, 0x2A, 0x01, 0x03, 0x02, 0x05]
        );
    }

    #[test]
    fn test_combo_request_with_color_checksum_dropped() {
        // The Color sensor's selection is not valid for this profile
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);

        bus.queue_from_hub(&[0x5C, 0x25, 0x00, 0x10, 0x00, 0x50, 0x51, 0x52, 0x00, 0xC5]);
        engine.poll();

        assert!(!engine.combo_active());
        assert_eq!(bus.sent_len(), 0);
    }
}
