//! LED colors
//!
//! The device packs a color index and a 2-bit brightness into one 7-bit value:
//! `(color << 2) | brightness`.

/// Highest brightness level an LED accepts
pub const MAX_BRIGHTNESS: u8 = 3;

/// Named LED color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    Off = 0,
    Red = 1,
    OrangeRed = 2,
    Orange = 3,
    YellowOrange = 4,
    Yellow = 5,
    YellowGreen = 6,
    Green = 7,
    Turquoise = 8,
    Cyan = 9,
    GreenishBlue = 10,
    Blue = 11,
    BluePurple = 12,
    Purple = 13,
    Magenta = 14,
    MagentaRed = 15,
    MagentaRedder = 16,
    White = 17,
}

impl Color {
    pub const BLACK: Color = Color::Off;

    pub const ALL: [Color; 18] = [
        Color::Off,
        Color::Red,
        Color::OrangeRed,
        Color::Orange,
        Color::YellowOrange,
        Color::Yellow,
        Color::YellowGreen,
        Color::Green,
        Color::Turquoise,
        Color::Cyan,
        Color::GreenishBlue,
        Color::Blue,
        Color::BluePurple,
        Color::Purple,
        Color::Magenta,
        Color::MagentaRed,
        Color::MagentaRedder,
        Color::White,
    ];

    /// Color for a raw index, clamping anything past the last color to white
    pub fn from_index(index: u8) -> Color {
        Self::ALL[(index as usize).min(Self::ALL.len() - 1)]
    }

    /// Pack with a brightness level (0..=3, higher levels are clamped)
    pub fn with_brightness(self, brightness: u8) -> u8 {
        (self as u8) << 2 | brightness.min(MAX_BRIGHTNESS)
    }

    /// Unpack a lighting byte into color and brightness
    pub fn from_byte(byte: u8) -> (Color, u8) {
        let byte = byte & 0x7f;
        (Self::from_index(byte >> 2), byte & 0x03)
    }

    /// Display name used by the setup tables
    pub fn name(self) -> &'static str {
        match self {
            Color::Off => "OFF",
            Color::Red => "RED",
            Color::OrangeRed => "ORANGE_RED",
            Color::Orange => "ORANGE",
            Color::YellowOrange => "YELLOW_ORANGE",
            Color::Yellow => "YELLOW",
            Color::YellowGreen => "YELLOW_GREEN",
            Color::Green => "GREEN",
            Color::Turquoise => "TURQUOISE",
            Color::Cyan => "CYAN",
            Color::GreenishBlue => "GREENISH_BLUE",
            Color::Blue => "BLUE",
            Color::BluePurple => "BLUE_PURPLE",
            Color::Purple => "PURPLE",
            Color::Magenta => "MAGENTA",
            Color::MagentaRed => "MAGENTA_RED",
            Color::MagentaRedder => "MAGENTA_REDDER",
            Color::White => "WHITE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_packing() {
        assert_eq!(Color::Off.with_brightness(0), 0x00);
        assert_eq!(Color::Red.with_brightness(2), 0x06);
        assert_eq!(Color::White.with_brightness(3), 0x47);
    }

    #[test]
    fn test_out_of_range_color_clamps_to_white() {
        assert_eq!(Color::from_byte(0x7e), (Color::White, 2));
        assert_eq!(Color::from_byte(18 << 2 | 1), (Color::White, 1));
    }

    proptest! {
        #[test]
        fn prop_color_byte_round_trip(index in 0usize..18, brightness in 0u8..=3) {
            let color = Color::ALL[index];
            prop_assert_eq!(Color::from_byte(color.with_brightness(brightness)), (color, brightness));
        }
    }
}
