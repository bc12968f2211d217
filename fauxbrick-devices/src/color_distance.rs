//! Boost Color & Distance sensor profile (type `0x25`)
//!
//! Ten modes, no combo support. The hub's NACK polls are answered with
//! the extended SPEC1 mode (mode 8), so every default response carries
//! the extended-mode preamble. Mode 0 reads back the LED color, not the
//! detected color, matching bus captures of the real sensor.

use fauxbrick_core::{DeviceProfile, InitBlock, ModeInfo};

// Mode numbers
const MODE_COLOR: u8 = 0; // read: current LED color
const MODE_PROX: u8 = 1; // read: distance 0..10
const MODE_COUNT: u8 = 2; // read: detections closer than 5 cm
const MODE_REFLT: u8 = 3; // read: reflected light 0..100
const MODE_AMBI: u8 = 4; // read: ambient light 0..100
const MODE_COL_O: u8 = 5; // write: LED color
const MODE_RGB_I: u8 = 6; // read: raw RGB channels
const MODE_IR_TX: u8 = 7; // write: Power Functions IR code
const MODE_SPEC1: u8 = 8; // read: color+distance+LED+reflected bundle
const MODE_DEBUG: u8 = 9; // best-effort diagnostic dump

const MODES: &[ModeInfo] = &[
    ModeInfo::read(MODE_COLOR, 1, 1),
    ModeInfo::read(MODE_PROX, 1, 1),
    ModeInfo::read(MODE_COUNT, 4, 8),
    ModeInfo::read(MODE_REFLT, 1, 1),
    ModeInfo::read(MODE_AMBI, 1, 1),
    ModeInfo::write(MODE_COL_O, 1, &[0xFF]),
    ModeInfo::read(MODE_RGB_I, 6, 8),
    ModeInfo::write(MODE_IR_TX, 2, &[0x42, 0x41]),
    ModeInfo::read(MODE_SPEC1, 4, 4),
    ModeInfo::diagnostic(MODE_DEBUG),
];

const INIT: &[InitBlock] = &[
    InitBlock {
        chunks: &[
            // Type ID: 0x25
            &[0x40, 0x25, 0x9A],
            // CMD_MODES: 8 modes, 8 views; ext: 11 modes, 8 views
            &[0x51, 0x07, 0x07, 0x0A, 0x07, 0xA3],
            // CMD_SPEED: 115200
            &[0x52, 0x00, 0xC2, 0x01, 0x00, 0x6E],
            // CMD_VERSION: fw 1.0.0.0, hw 1.0.0.0
            &[0x5F, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0xA0],
        ],
        delay_ms: 10,
    },
    // Mode 10: "CALIB"
    InitBlock {
        chunks: &[
            &[0x9A, 0x20, 0x43, 0x41, 0x4C, 0x49, 0x42, 0x00, 0x00, 0x00, 0x00],
            // Range: 0 to 65535
            &[0x9A, 0x21, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0x83],
            // PCT range: 0 to 100
            &[0x9A, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xCD],
            // SI range: 0 to 65535
            &[0x9A, 0x23, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0x81],
            // SI symbol: "N/A"
            &[0x92, 0x24, 0x4E, 0x2F, 0x41, 0x00, 0x69],
            // Mapping: absolute in, nothing out
            &[0x8A, 0x25, 0x10, 0x00, 0x40],
            // Format: 8x int16, 5 chars, 0 decimals
            &[0x92, 0xA0, 0x08, 0x01, 0x05, 0x00, 0xC1],
        ],
        delay_ms: 10,
    },
    // Mode 9: "DEBUG"
    InitBlock {
        chunks: &[
            &[0x99, 0x20, 0x44, 0x45, 0x42, 0x55, 0x47, 0x00, 0x00, 0x00, 0x17],
            &[0x99, 0x21, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0xBC],
            &[0x99, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xCE],
            &[0x99, 0x23, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x24],
            &[0x91, 0x24, 0x4E, 0x2F, 0x41, 0x00, 0x6A],
            &[0x89, 0x25, 0x10, 0x00, 0x43],
            &[0x91, 0xA0, 0x02, 0x01, 0x05, 0x00, 0xC8],
        ],
        delay_ms: 10,
    },
    // Mode 8: "SPEC 1"
    InitBlock {
        chunks: &[
            &[0x98, 0x20, 0x53, 0x50, 0x45, 0x43, 0x20, 0x31, 0x00, 0x00, 0x53],
            &[0x98, 0x21, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7F, 0x43, 0x7A],
            &[0x98, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xCF],
            &[0x98, 0x23, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7F, 0x43, 0x78],
            &[0x90, 0x24, 0x4E, 0x2F, 0x41, 0x00, 0x6B],
            &[0x88, 0x25, 0x00, 0x00, 0x52],
            &[0x90, 0xA0, 0x04, 0x00, 0x03, 0x00, 0xC8],
        ],
        delay_ms: 10,
    },
    // Mode 7: "IR Tx"
    InitBlock {
        chunks: &[
            &[0x9F, 0x00, 0x49, 0x52, 0x20, 0x54, 0x78, 0x00, 0x00, 0x00, 0x77],
            &[0x9F, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0xA6],
            &[0x9F, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xE8],
            &[0x9F, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0xA4],
            &[0x97, 0x04, 0x4E, 0x2F, 0x41, 0x00, 0x4C],
            // Mapping: nothing in, discrete out
            &[0x8F, 0x05, 0x00, 0x04, 0x71],
            &[0x97, 0x80, 0x01, 0x01, 0x05, 0x00, 0xED],
        ],
        delay_ms: 10,
    },
    // Mode 6: "RGB I"
    InitBlock {
        chunks: &[
            &[0x9E, 0x00, 0x52, 0x47, 0x42, 0x20, 0x49, 0x00, 0x00, 0x00, 0x5F],
            &[0x9E, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0x9B],
            &[0x9E, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xE9],
            &[0x9E, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x7F, 0x44, 0x99],
            &[0x96, 0x04, 0x52, 0x41, 0x57, 0x00, 0x29],
            &[0x8E, 0x05, 0x10, 0x00, 0x64],
            &[0x96, 0x80, 0x03, 0x01, 0x05, 0x00, 0xEE],
        ],
        delay_ms: 10,
    },
    // Mode 5: "COL O"
    InitBlock {
        chunks: &[
            &[0x9D, 0x00, 0x43, 0x4F, 0x4C, 0x20, 0x4F, 0x00, 0x00, 0x00, 0x4D],
            &[0x9D, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x02],
            &[0x9D, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEA],
            &[0x9D, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x00],
            &[0x95, 0x04, 0x49, 0x44, 0x58, 0x00, 0x3B],
            &[0x8D, 0x05, 0x00, 0x04, 0x73],
            &[0x95, 0x80, 0x01, 0x00, 0x03, 0x00, 0xE8],
        ],
        delay_ms: 10,
    },
    // Mode 4: "AMBI"
    InitBlock {
        chunks: &[
            &[0x94, 0x00, 0x41, 0x4D, 0x42, 0x49, 0x6C],
            &[0x9C, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xE8],
            &[0x9C, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEB],
            &[0x9C, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEA],
            &[0x94, 0x04, 0x50, 0x43, 0x54, 0x00, 0x28],
            &[0x8C, 0x05, 0x10, 0x00, 0x66],
            &[0x94, 0x80, 0x01, 0x00, 0x03, 0x00, 0xE9],
        ],
        delay_ms: 10,
    },
    // Mode 3: "REFLT"
    InitBlock {
        chunks: &[
            &[0x9B, 0x00, 0x52, 0x45, 0x46, 0x4C, 0x54, 0x00, 0x00, 0x00, 0x2D],
            &[0x9B, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            &[0x9B, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x9B, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x93, 0x04, 0x50, 0x43, 0x54, 0x00, 0x2F],
            &[0x8B, 0x05, 0x10, 0x00, 0x61],
            &[0x93, 0x80, 0x01, 0x00, 0x03, 0x00, 0xEE],
        ],
        delay_ms: 10,
    },
    // Mode 2: "COUNT"
    InitBlock {
        chunks: &[
            &[0x9A, 0x00, 0x43, 0x4F, 0x55, 0x4E, 0x54, 0x00, 0x00, 0x00, 0x26],
            &[0x9A, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x9A, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x9A, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x92, 0x04, 0x43, 0x4E, 0x54, 0x00, 0x30],
            // Mapping: relative in, nothing out
            &[0x8A, 0x05, 0x08, 0x00, 0x78],
            &[0x92, 0x80, 0x01, 0x02, 0x04, 0x00, 0xEA],
        ],
        delay_ms: 10,
    },
    // Mode 1: "PROX"
    InitBlock {
        chunks: &[
            &[0x91, 0x00, 0x50, 0x52, 0x4F, 0x58, 0x7B],
            &[0x99, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x06],
            &[0x99, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x99, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x04],
            &[0x91, 0x04, 0x44, 0x49, 0x53, 0x00, 0x34],
            &[0x89, 0x05, 0x50, 0x00, 0x23],
            &[0x91, 0x80, 0x01, 0x00, 0x03, 0x00, 0xEC],
        ],
        delay_ms: 10,
    },
    // Mode 0: "COLOR"
    InitBlock {
        chunks: &[
            &[0x98, 0x00, 0x43, 0x4F, 0x4C, 0x4F, 0x52, 0x00, 0x00, 0x00, 0x3A],
            &[0x98, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x07],
            &[0x98, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            &[0x98, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x05],
            &[0x90, 0x04, 0x49, 0x44, 0x58, 0x00, 0x3E],
            &[0x88, 0x05, 0xC4, 0x00, 0xB6],
            &[0x90, 0x80, 0x01, 0x00, 0x03, 0x00, 0xED],
            // Combinable modes: color, proximity, count, reflectance, RGB I
            &[0x88, 0x06, 0x4F, 0x00, 0x3E],
        ],
        delay_ms: 10,
    },
    InitBlock {
        chunks: &[&[0x04]],
        delay_ms: 5,
    },
];

/// Color & Distance sensor bindings
///
/// `color` and `led_color` take the codes from [`crate::Color`];
/// `distance` is the discretized 0..10 proximity value.
#[derive(Debug, Clone)]
pub struct ColorDistanceSensor {
    /// Detected color (0xFF when nothing is in view)
    pub color: u8,
    /// Distance to the nearest object, 0..10
    pub distance: u8,
    /// Detections closer than 5 cm
    pub detection_count: u32,
    /// Reflected light, 0..100
    pub reflected_light: u8,
    /// Ambient light, 0..100
    pub ambient_light: u8,
    /// Raw RGB channel values, 0..1023
    pub rgb: [u16; 3],
    /// Current LED color, hub-writable
    pub led_color: u8,
    /// Last Power Functions IR code the hub asked us to transmit
    pub ir_code: u16,
    /// Fired when the hub sets the LED color
    pub on_led_color: Option<fn(u8)>,
    /// Fired when the hub queues an IR code
    pub on_ir_code: Option<fn(u16)>,
}

impl Default for ColorDistanceSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorDistanceSensor {
    /// Create a sensor with all values zeroed and no color in view
    pub fn new() -> Self {
        Self {
            color: 0xFF,
            distance: 0,
            detection_count: 0,
            reflected_light: 0,
            ambient_light: 0,
            rgb: [0; 3],
            led_color: 0,
            ir_code: 0,
            on_led_color: None,
            on_ir_code: None,
        }
    }
}

impl DeviceProfile for ColorDistanceSensor {
    fn init_sequence(&self) -> &'static [InitBlock] {
        INIT
    }

    fn modes(&self) -> &'static [ModeInfo] {
        MODES
    }

    fn default_mode(&self) -> u8 {
        MODE_SPEC1
    }

    fn read_value(&self, mode: u8, out: &mut [u8]) {
        match mode {
            MODE_COLOR => out[0] = self.led_color,
            MODE_PROX => out[0] = self.distance,
            MODE_COUNT => out[..4].copy_from_slice(&self.detection_count.to_le_bytes()),
            MODE_REFLT => out[0] = self.reflected_light,
            MODE_AMBI => out[0] = self.ambient_light,
            MODE_RGB_I => {
                for (i, channel) in self.rgb.iter().enumerate() {
                    out[i * 2..i * 2 + 2].copy_from_slice(&channel.to_le_bytes());
                }
            }
            MODE_SPEC1 => {
                out[0] = self.color;
                out[1] = self.distance;
                out[2] = self.led_color;
                out[3] = self.reflected_light;
            }
            _ => {}
        }
    }

    fn write_value(&mut self, mode: u8, data: &[u8]) {
        match mode {
            MODE_COL_O => {
                self.led_color = data[0];
                if let Some(callback) = self.on_led_color {
                    callback(self.led_color);
                }
            }
            MODE_IR_TX => {
                self.ir_code = u16::from_le_bytes([data[0], data[1]]);
                if let Some(callback) = self.on_ir_code {
                    callback(self.ir_code);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_init_chunks_sealed;
    use core::sync::atomic::{AtomicU16, AtomicU8, AtomicUsize, Ordering};
    use fauxbrick_core::Engine;
    use fauxbrick_hal::mock::{SimBus, SimClock, SimSerial};

    type CdsEngine<'a> = Engine<SimSerial<'a>, SimClock<'a>, ColorDistanceSensor>;

    fn connected_engine(bus: &SimBus) -> CdsEngine<'_> {
        let mut engine = Engine::new(bus.serial(), bus.clock(), ColorDistanceSensor::new());
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
        assert_eq!(INIT[0].chunks[0], &[0x40, 0x25, 0x9A]);
        // EOF closes the sequence
        let eof = INIT.last().unwrap();
        assert_eq!(eof.chunks.len(), 1);
        assert_eq!(eof.chunks[0], &[0x04]);
    }

    #[test]
    fn test_nack_default_is_spec1_with_preamble() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        {
            let device = engine.device_mut();
            device.color = 9;
            device.distance = 5;
            device.led_color = 3;
            device.reflected_light = 0x28;
        }

        bus.queue_from_hub(&[0x02]);
        engine.poll();

        let sent = bus.take_sent();
        assert_eq!(&sent[..3], &[0x46, 0x08, 0xB1]);
        assert_eq!(&sent[3..], &[0xD0, 0x09, 0x05, 0x03, 0x28, 0x08]);
    }

    #[test]
    fn test_get_rgb_channels() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().rgb = [0x0102, 0x0304, 0x0506];

        bus.queue_from_hub(&[0x43, 0x06, 0x00]);
        engine.poll();

        assert_eq!(
            bus.take_sent().as_slice(),
            &[0xDE, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x00, 0x00, 0x26]
        );
    }

    #[test]
    fn test_get_detection_count() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().detection_count = 0x0102_0304;

        bus.queue_from_hub(&[0x43, 0x02, 0x00]);
        engine.poll();

        assert_eq!(
            bus.take_sent().as_slice(),
            &[0xDA, 0x04, 0x03, 0x02, 0x01, 0x00, 0x00, 0x00, 0x00, 0x21]
        );
    }

    static LED_SEEN: AtomicU8 = AtomicU8::new(0);
    static LED_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn led_callback(value: u8) {
        LED_SEEN.store(value, Ordering::Relaxed);
        LED_CALLS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_set_led_color_fires_callback_once() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().on_led_color = Some(led_callback);

        bus.queue_from_hub(&[0x46, 0x00, 0xB9, 0xC5, 0x05, 0x3F]);
        engine.poll();

        assert_eq!(engine.device().led_color, 5);
        assert_eq!(LED_SEEN.load(Ordering::Relaxed), 5);
        assert_eq!(LED_CALLS.load(Ordering::Relaxed), 1);
        // No reply to write queries
        assert_eq!(bus.sent_len(), 0);
    }

    static IR_SEEN: AtomicU16 = AtomicU16::new(0);

    fn ir_callback(code: u16) {
        IR_SEEN.store(code, Ordering::Relaxed);
    }

    #[test]
    fn test_set_ir_code() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().on_ir_code = Some(ir_callback);

        // Little-endian payload: 0x4142
        bus.queue_from_hub(&[0x46, 0x00, 0xB9, 0xCF, 0x42, 0x41, 0x33]);
        engine.poll();

        assert_eq!(engine.device().ir_code, 0x4142);
        assert_eq!(IR_SEEN.load(Ordering::Relaxed), 0x4142);
    }

    #[test]
    fn test_combo_requests_ignored() {
        // This profile has no combo support; the headers fall through
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);

        bus.queue_from_hub(&[0x5C, 0x25, 0x00, 0x10, 0x00, 0x50, 0x51, 0x52, 0x00, 0xC5]);
        engine.poll();

        assert!(!engine.combo_active());
        assert_eq!(bus.sent_len(), 0);
    }

    #[test]
    fn test_get_unknown_mode_unanswered() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);

        bus.queue_from_hub(&[0x43, 0x0A, 0x00]);
        engine.poll();

        assert_eq!(bus.sent_len(), 0);
        assert!(engine.is_connected());
    }
}
