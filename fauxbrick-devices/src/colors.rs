//! Discretized color codes
//!
//! Shared by the color-sensing profiles: the detected-color modes report
//! these values, and the Color & Distance sensor's LED accepts a subset
//! of them.

/// Color code as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Black,
    Pink,
    Purple,
    Blue,
    LightBlue,
    Cyan,
    Green,
    Yellow,
    Orange,
    Red,
    White,
    /// Nothing detected
    None,
}

// Wire format values
const COLOR_BLACK: u8 = 0;
const COLOR_PINK: u8 = 1;
const COLOR_PURPLE: u8 = 2;
const COLOR_BLUE: u8 = 3;
const COLOR_LIGHTBLUE: u8 = 4;
const COLOR_CYAN: u8 = 5;
const COLOR_GREEN: u8 = 6;
const COLOR_YELLOW: u8 = 7;
const COLOR_ORANGE: u8 = 8;
const COLOR_RED: u8 = 9;
const COLOR_WHITE: u8 = 10;
const COLOR_NONE: u8 = 0xFF;

impl Color {
    /// Parse a color from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            COLOR_BLACK => Some(Color::Black),
            COLOR_PINK => Some(Color::Pink),
            COLOR_PURPLE => Some(Color::Purple),
            COLOR_BLUE => Some(Color::Blue),
            COLOR_LIGHTBLUE => Some(Color::LightBlue),
            COLOR_CYAN => Some(Color::Cyan),
            COLOR_GREEN => Some(Color::Green),
            COLOR_YELLOW => Some(Color::Yellow),
            COLOR_ORANGE => Some(Color::Orange),
            COLOR_RED => Some(Color::Red),
            COLOR_WHITE => Some(Color::White),
            COLOR_NONE => Some(Color::None),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Color::Black => COLOR_BLACK,
            Color::Pink => COLOR_PINK,
            Color::Purple => COLOR_PURPLE,
            Color::Blue => COLOR_BLUE,
            Color::LightBlue => COLOR_LIGHTBLUE,
            Color::Cyan => COLOR_CYAN,
            Color::Green => COLOR_GREEN,
            Color::Yellow => COLOR_YELLOW,
            Color::Orange => COLOR_ORANGE,
            Color::Red => COLOR_RED,
            Color::White => COLOR_WHITE,
            Color::None => COLOR_NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_roundtrip() {
        let colors = [
            Color::Black,
            Color::Pink,
            Color::Purple,
            Color::Blue,
            Color::LightBlue,
            Color::Cyan,
            Color::Green,
            Color::Yellow,
            Color::Orange,
            Color::Red,
            Color::White,
            Color::None,
        ];

        for color in colors {
            assert_eq!(Color::from_byte(color.to_byte()), Some(color));
        }
    }

    #[test]
    fn test_unknown_byte() {
        assert_eq!(Color::from_byte(11), None);
        assert_eq!(Color::from_byte(0x80), None);
    }

    #[test]
    fn test_none_is_sentinel() {
        assert_eq!(Color::None.to_byte(), 0xFF);
    }
}
