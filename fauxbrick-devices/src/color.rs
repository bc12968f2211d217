//! Spike/Technic Color sensor profile (type `0x3D`)
//!
//! Advertises ten modes; this implementation serves the detected-color,
//! reflected/ambient light, LED brightness, RGB and HSV modes, and
//! supports the hub's combo-mode selection of (reflected, color, RGB).
//! Modes 4 (RREFL) and 7 (SHSV) are advertised in the handshake but not
//! served; hubs have not been seen to query them.

use fauxbrick_core::{ComboLayout, DeviceProfile, InitBlock, ModeInfo};

// Mode numbers
const MODE_COLOR: u8 = 0; // read: detected color
const MODE_REFLT: u8 = 1; // read: reflected light 0..100
const MODE_AMBI: u8 = 2; // read: ambient light 0..100
const MODE_LIGHT: u8 = 3; // write: brightness of the three built-in lights
const MODE_RGB_I: u8 = 5; // read: raw RGB channels
const MODE_HSV: u8 = 6; // read: raw HSV channels
const MODE_DEBUG: u8 = 8; // best-effort diagnostic dump

const MODES: &[ModeInfo] = &[
    ModeInfo::read(MODE_COLOR, 1, 1),
    ModeInfo::read(MODE_REFLT, 1, 1),
    ModeInfo::read(MODE_AMBI, 1, 1),
    ModeInfo::write(MODE_LIGHT, 3, &[0xFF, 0x80, 0x40]),
    ModeInfo::read(MODE_RGB_I, 6, 8),
    ModeInfo::read(MODE_HSV, 6, 8),
    ModeInfo::diagnostic(MODE_DEBUG),
];

/// The one combo selection this profile accepts:
/// reflected (1,0), color (0,0), RGB (5,0) (5,1) (5,2)
const COMBO: ComboLayout = ComboLayout {
    request_echo: &[0x25, 0x00, 0x10, 0x00, 0x50, 0x51, 0x52, 0x00],
    request_checksum: 0xC5,
    wire_len: 8,
};

const INIT: &[InitBlock] = &[
    InitBlock {
        chunks: &[
            // Type ID: 0x3D
            &[0x40, 0x3D, 0x82],
            // CMD_MODES: 8 modes, 8 views; ext: 10 modes, 1 view
            &[0x51, 0x07, 0x07, 0x09, 0x00, 0xA7],
            // CMD_SPEED: 115200
            &[0x52, 0x00, 0xC2, 0x01, 0x00, 0x6E],
            // CMD_VERSION: fw 1.0.0.0, hw 1.0.0.0
            &[0x5F, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0xA0],
        ],
        delay_ms: 10,
    },
    // Mode 9: "CALIB"
    InitBlock {
        chunks: &[
            &[
                0xA1, 0x20, 0x43, 0x41, 0x4C, 0x49, 0x42, 0x00, 0x40, 0x40, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xBB,
            ],
            &[0x99, 0x21, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0x80],
            &[0x99, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xCE],
            &[0x99, 0x23, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0x82],
            // SI symbol: none
            &[0x81, 0x24, 0x00, 0x5A],
            &[0x89, 0x25, 0x00, 0x00, 0x53],
            &[0x91, 0xA0, 0x07, 0x01, 0x05, 0x00, 0xCD],
        ],
        delay_ms: 10,
    },
    // Mode 8: "DEBUG"
    InitBlock {
        chunks: &[
            &[
                0xA0, 0x20, 0x44, 0x45, 0x42, 0x55, 0x47, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xEE,
            ],
            &[0x98, 0x21, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0x81],
            &[0x98, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xCF],
            &[0x98, 0x23, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x7F, 0x47, 0x83],
            &[0x90, 0x24, 0x52, 0x41, 0x57, 0x00, 0x0F],
            &[0x88, 0x25, 0x10, 0x00, 0x42],
            &[0x90, 0xA0, 0x04, 0x01, 0x04, 0x00, 0xCE],
        ],
        delay_ms: 10,
    },
    // Mode 7: "SHSV"
    InitBlock {
        chunks: &[
            &[
                0xA7, 0x00, 0x53, 0x48, 0x53, 0x56, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0x86,
            ],
            &[0x9F, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xB4, 0x43, 0x96],
            &[0x9F, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xE8],
            &[0x9F, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xB4, 0x43, 0x94],
            &[0x97, 0x04, 0x52, 0x41, 0x57, 0x00, 0x28],
            &[0x8F, 0x05, 0x10, 0x00, 0x65],
            &[0x97, 0x80, 0x04, 0x01, 0x04, 0x00, 0xE9],
        ],
        delay_ms: 10,
    },
    // Mode 6: "HSV"
    InitBlock {
        chunks: &[
            &[
                0xA6, 0x00, 0x48, 0x53, 0x56, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xD4,
            ],
            &[0x9E, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xB4, 0x43, 0x97],
            &[0x9E, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xE9],
            &[0x9E, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xB4, 0x43, 0x95],
            &[0x96, 0x04, 0x52, 0x41, 0x57, 0x00, 0x29],
            &[0x8E, 0x05, 0x10, 0x00, 0x64],
            &[0x96, 0x80, 0x03, 0x01, 0x04, 0x00, 0xEF],
        ],
        delay_ms: 10,
    },
    // Mode 5: "RGB I"
    InitBlock {
        chunks: &[
            &[
                0xA5, 0x00, 0x52, 0x47, 0x42, 0x20, 0x49, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xA4,
            ],
            &[0x9D, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x44, 0xA7],
            &[0x9D, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEA],
            &[0x9D, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x44, 0xA5],
            &[0x95, 0x04, 0x52, 0x41, 0x57, 0x00, 0x2A],
            &[0x8D, 0x05, 0x10, 0x00, 0x67],
            &[0x95, 0x80, 0x04, 0x01, 0x04, 0x00, 0xEB],
        ],
        delay_ms: 10,
    },
    // Mode 4: "RREFL" (advertised, not served)
    InitBlock {
        chunks: &[
            &[
                0xA4, 0x00, 0x52, 0x52, 0x45, 0x46, 0x4C, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xD4,
            ],
            &[0x9C, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x44, 0xA6],
            &[0x9C, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEB],
            &[0x9C, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x44, 0xA4],
            &[0x94, 0x04, 0x52, 0x41, 0x57, 0x00, 0x2B],
            &[0x8C, 0x05, 0x10, 0x00, 0x66],
            &[0x94, 0x80, 0x02, 0x01, 0x04, 0x00, 0xEC],
        ],
        delay_ms: 10,
    },
    // Mode 3: "LIGHT"
    InitBlock {
        chunks: &[
            &[
                0xA3, 0x00, 0x4C, 0x49, 0x47, 0x48, 0x54, 0x00, 0x40, 0x00, 0x00, 0x00, 0x05,
                0x04, 0x00, 0x00, 0x00, 0x00, 0x43,
            ],
            &[0x9B, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            &[0x9B, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x9B, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x93, 0x04, 0x50, 0x43, 0x54, 0x00, 0x2F],
            // Mapping: nothing in, absolute out
            &[0x8B, 0x05, 0x00, 0x10, 0x61],
            &[0x93, 0x80, 0x03, 0x00, 0x03, 0x00, 0xEC],
        ],
        delay_ms: 10,
    },
    // Mode 2: "AMBI"
    InitBlock {
        chunks: &[
            &[
                0xA2, 0x00, 0x41, 0x4D, 0x42, 0x49, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0x9A,
            ],
            &[0x9A, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x9A, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x9A, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEC],
            &[0x92, 0x04, 0x50, 0x43, 0x54, 0x00, 0x2E],
            &[0x8A, 0x05, 0x30, 0x00, 0x40],
            &[0x92, 0x80, 0x01, 0x00, 0x03, 0x00, 0xEF],
        ],
        delay_ms: 10,
    },
    // Mode 1: "REFLT"
    InitBlock {
        chunks: &[
            &[
                0xA1, 0x00, 0x52, 0x45, 0x46, 0x4C, 0x54, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xD7,
            ],
            &[0x99, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xED],
            &[0x99, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEE],
            &[0x99, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            &[0x91, 0x04, 0x50, 0x43, 0x54, 0x00, 0x2D],
            &[0x89, 0x05, 0x30, 0x00, 0x43],
            &[0x91, 0x80, 0x01, 0x00, 0x03, 0x00, 0xEC],
        ],
        delay_ms: 10,
    },
    // Mode 0: "COLOR"
    InitBlock {
        chunks: &[
            &[
                0xA0, 0x00, 0x43, 0x4F, 0x4C, 0x4F, 0x52, 0x00, 0x40, 0x00, 0x00, 0x00, 0x04,
                0x84, 0x00, 0x00, 0x00, 0x00, 0xC2,
            ],
            &[0x98, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x07],
            &[0x98, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42, 0xEF],
            &[0x98, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x41, 0x05],
            &[0x90, 0x04, 0x49, 0x44, 0x58, 0x00, 0x3E],
            &[0x88, 0x05, 0xE4, 0x00, 0x96],
            &[0x90, 0x80, 0x01, 0x00, 0x02, 0x00, 0xEC],
            // Combinable modes: color, reflection, RGB I, HSV
            &[0x88, 0x06, 0x63, 0x00, 0x12],
            // Trailing vendor block of unknown meaning, sent as captured
            &[
                0xA0, 0x08, 0x00, 0x3C, 0x00, 0x31, 0x0A, 0x47, 0x39, 0x32, 0x35, 0x33, 0x39,
                0x39, 0x00, 0x00, 0x00, 0x00, 0x1A,
            ],
        ],
        delay_ms: 10,
    },
    InitBlock {
        chunks: &[&[0x04]],
        delay_ms: 5,
    },
];

/// Color sensor bindings
///
/// Color identification from reflected light uses the RGB channels; for
/// screens and light sources the HSV channels are the ones to feed.
#[derive(Debug, Clone)]
pub struct ColorSensor {
    /// Detected color code (0xFF when nothing is in view)
    pub color: u8,
    /// Reflected light, 0..100
    pub reflected_light: u8,
    /// Ambient light, 0..100
    pub ambient_light: u8,
    /// Raw RGB channel values, 0..1023
    pub rgb: [u16; 3],
    /// Raw hue/saturation/value channels
    pub hsv: [u16; 3],
    /// Brightness of the three built-in lights (left, bottom, right),
    /// hub-writable
    pub led_brightness: [u8; 3],
    /// Fired when the hub sets the light brightnesses
    pub on_led_brightness: Option<fn([u8; 3])>,
}

impl Default for ColorSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSensor {
    /// Create a sensor with all values zeroed and no color in view
    pub fn new() -> Self {
        Self {
            color: 0xFF,
            reflected_light: 0,
            ambient_light: 0,
            rgb: [0; 3],
            hsv: [0; 3],
            led_brightness: [0; 3],
            on_led_brightness: None,
        }
    }
}

impl DeviceProfile for ColorSensor {
    fn init_sequence(&self) -> &'static [InitBlock] {
        INIT
    }

    fn modes(&self) -> &'static [ModeInfo] {
        MODES
    }

    fn default_mode(&self) -> u8 {
        MODE_COLOR
    }

    fn combo_layout(&self) -> Option<&'static ComboLayout> {
        Some(&COMBO)
    }

    fn read_value(&self, mode: u8, out: &mut [u8]) {
        match mode {
            MODE_COLOR => out[0] = self.color,
            MODE_REFLT => out[0] = self.reflected_light,
            MODE_AMBI => out[0] = self.ambient_light,
            MODE_RGB_I => {
                for (i, channel) in self.rgb.iter().enumerate() {
                    out[i * 2..i * 2 + 2].copy_from_slice(&channel.to_le_bytes());
                }
            }
            MODE_HSV => {
                for (i, channel) in self.hsv.iter().enumerate() {
                    out[i * 2..i * 2 + 2].copy_from_slice(&channel.to_le_bytes());
                }
            }
            _ => {}
        }
    }

    fn write_value(&mut self, mode: u8, data: &[u8]) {
        if mode == MODE_LIGHT {
            self.led_brightness = [data[0], data[1], data[2]];
            if let Some(callback) = self.on_led_brightness {
                callback(self.led_brightness);
            }
        }
    }

    fn compose_combo(&self, out: &mut [u8]) {
        out[0] = self.reflected_light;
        out[1] = self.color;
        for (i, channel) in self.rgb.iter().enumerate() {
            out[2 + i * 2..4 + i * 2].copy_from_slice(&channel.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_init_chunks_sealed;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use fauxbrick_core::Engine;
    use fauxbrick_hal::mock::{SimBus, SimClock, SimSerial};

    type ColorEngine<'a> = Engine<SimSerial<'a>, SimClock<'a>, ColorSensor>;

    fn connected_engine(bus: &SimBus) -> ColorEngine<'_> {
        let mut engine = Engine::new(bus.serial(), bus.clock(), ColorSensor::new());
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
        assert_eq!(INIT[0].chunks[0], &[0x40, 0x3D, 0x82]);
    }

    #[test]
    fn test_nack_default_is_color_frame() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().color = 6;

        bus.queue_from_hub(&[0x02]);
        engine.poll();

        assert_eq!(bus.take_sent().as_slice(), &[0xC0, 0x06, 0x39]);
    }

    #[test]
    fn test_get_hsv_channels() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().hsv = [180, 50, 100];

        bus.queue_from_hub(&[0x43, 0x06, 0x00]);
        engine.poll();

        assert_eq!(
            bus.take_sent().as_slice(),
            &[0xDE, 0xB4, 0x00, 0x32, 0x00, 0x64, 0x00, 0x00, 0x00, 0xC3]
        );
    }

    #[test]
    fn test_get_rgb_channels() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().rgb = [0x0102, 0x0304, 0x0506];

        bus.queue_from_hub(&[0x43, 0x05, 0x00]);
        engine.poll();

        assert_eq!(
            bus.take_sent().as_slice(),
            &[0xDD, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x00, 0x00, 0x25]
        );
    }

    static BRIGHTNESS_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn brightness_callback(values: [u8; 3]) {
        assert_eq!(values, [0x64, 0x32, 0x10]);
        BRIGHTNESS_CALLS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_set_light_brightness_fires_callback_once() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        engine.device_mut().on_led_brightness = Some(brightness_callback);

        // Three brightness bytes, padded to the 4-byte size class
        bus.queue_from_hub(&[0x46, 0x00, 0xB9, 0xD3, 0x64, 0x32, 0x10, 0x00, 0x6A]);
        engine.poll();

        assert_eq!(engine.device().led_brightness, [0x64, 0x32, 0x10]);
        assert_eq!(BRIGHTNESS_CALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_combo_selection_switches_nack_response() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);
        {
            let device = engine.device_mut();
            device.color = 0x06;
            device.reflected_light = 0x32;
            device.rgb = [0x0102, 0x0304, 0x0506];
        }

        bus.queue_from_hub(&[0x5C, 0x25, 0x00, 0x10, 0x00, 0x50, 0x51, 0x52, 0x00, 0xC5]);
        engine.poll();
        assert!(engine.combo_active());
        assert_eq!(
            bus.take_sent().as_slice(),
            &[0x5C, 0x25, 0x00, 0x10, 0x00, 0x50, 0x51, 0x52, 0x00, 0xC5]
        );

        bus.queue_from_hub(&[0x02]);
        engine.poll();
        assert_eq!(
            bus.take_sent().as_slice(),
            &[0xD8, 0x32, 0x06, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x14]
        );

        // Reset restores the plain color default
        bus.queue_from_hub(&[0x4C, 0x20, 0x00, 0x93]);
        engine.poll();
        assert!(!engine.combo_active());
        assert_eq!(bus.take_sent().as_slice(), &[0x44, 0x20, 0x9B]);

        bus.queue_from_hub(&[0x02]);
        engine.poll();
        assert_eq!(bus.take_sent().as_slice(), &[0xC0, 0x06, 0x39]);
    }

    #[test]
    fn test_advertised_but_unserved_mode_is_silent() {
        let bus = SimBus::new();
        let mut engine = connected_engine(&bus);

        // RREFL is described in the handshake but has no registry entry
        bus.queue_from_hub(&[0x43, 0x04, 0x00]);
        engine.poll();

        assert_eq!(bus.sent_len(), 0);
    }
}
