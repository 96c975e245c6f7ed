//! Per-control configuration records
//!
//! Key zones, wheels/touch strip, knobs and display buttons each carry a small record
//! that the device keeps in RAM. Records serialize to fixed-size slots; the full
//! commands assembling the slots live in [`super::codec`].

use super::color::Color;

/// Velocity curve of a key zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VelocityCurve {
    Soft3,
    Soft2,
    Soft1,
    #[default]
    Linear,
    Hard1,
    Hard2,
    Hard3,
}

impl VelocityCurve {
    pub const ALL: [VelocityCurve; 7] = [
        Self::Soft3,
        Self::Soft2,
        Self::Soft1,
        Self::Linear,
        Self::Hard1,
        Self::Hard2,
        Self::Hard3,
    ];

    pub fn byte(self) -> u8 {
        match self {
            Self::Soft3 => 0x30,
            Self::Soft2 => 0x31,
            Self::Soft1 => 0x32,
            Self::Linear => 0x33,
            Self::Hard1 => 0x34,
            Self::Hard2 => 0x35,
            Self::Hard3 => 0x36,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Soft3 => "soft_3",
            Self::Soft2 => "soft_2",
            Self::Soft1 => "soft_1",
            Self::Linear => "linear",
            Self::Hard1 => "hard_1",
            Self::Hard2 => "hard_2",
            Self::Hard3 => "hard_3",
        }
    }
}

/// Velocity byte the device expects for a disabled zone
const ZONE_OFF_BYTE: u8 = 0x83;

/// One keyboard split zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyZoneConfig {
    /// Highest key (0..127) belonging to this zone
    pub last_key: u8,
    /// MIDI channel 0..15
    pub midi_channel: u8,
    /// Transpose in semitones, -25..=25
    pub transpose: i8,
    pub velocity: VelocityCurve,
    pub color1: (Color, u8),
    pub color2: (Color, u8),
    pub off: bool,
}

impl Default for KeyZoneConfig {
    fn default() -> Self {
        Self {
            last_key: 127,
            midi_channel: 0,
            transpose: 0,
            velocity: VelocityCurve::Linear,
            color1: (Color::Blue, 0),
            color2: (Color::Blue, 2),
            off: false,
        }
    }
}

impl KeyZoneConfig {
    pub const SLOT_LEN: usize = 8;

    /// A zone that produces no notes
    pub fn disabled() -> Self {
        Self {
            off: true,
            ..Self::default()
        }
    }

    pub fn to_slot(&self) -> [u8; Self::SLOT_LEN] {
        [
            self.last_key,
            self.transpose as u8,
            self.midi_channel,
            if self.off { ZONE_OFF_BYTE } else { self.velocity.byte() },
            self.color1.0.with_brightness(self.color1.1),
            self.color2.0.with_brightness(self.color2.1),
            0x00,
            0x00,
        ]
    }
}

/// What a wheel or the touch strip sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliderMode {
    Off,
    #[default]
    Cc,
    PitchBend,
}

impl SliderMode {
    pub const ALL: [SliderMode; 3] = [Self::Off, Self::Cc, Self::PitchBend];

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Cc => "MOD",
            Self::PitchBend => "PITCH",
        }
    }
}

/// Touch strip behaviour. Stored and edited, but the device slot has no field for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripMode {
    #[default]
    Default,
    Retract,
    Glide,
    Discrete,
}

impl StripMode {
    pub const ALL: [StripMode; 4] = [Self::Default, Self::Retract, Self::Glide, Self::Discrete];

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Retract => "RETRACT",
            Self::Glide => "GLIDE",
            Self::Discrete => "DISCRETE",
        }
    }
}

/// Pitch wheel, mod wheel or touch strip configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderConfig {
    pub mode: SliderMode,
    /// CC number 1..127
    pub midi_cc: u8,
    /// MIDI channel 0..15
    pub midi_channel: u8,
    pub min_value: u16,
    pub max_value: u16,
    // Touch strip only
    pub strip_mode: StripMode,
    /// 0..8
    pub retraction_speed: u8,
    /// 0..4
    pub center_point: u8,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            mode: SliderMode::Cc,
            midi_cc: 1,
            midi_channel: 0,
            min_value: 0,
            max_value: 127,
            strip_mode: StripMode::Default,
            retraction_speed: 8,
            center_point: 0,
        }
    }
}

impl SliderConfig {
    pub const SLOT_LEN: usize = 12;
    pub const STRIP_SLOT_LEN: usize = 16;

    pub fn off() -> Self {
        Self {
            mode: SliderMode::Off,
            ..Self::default()
        }
    }

    /// Control-change slider on the given CC
    pub fn cc(midi_cc: u8, midi_channel: u8) -> Self {
        Self {
            midi_cc,
            midi_channel,
            ..Self::default()
        }
    }

    /// Pitch bend with a retracting strip
    pub fn pitch() -> Self {
        Self {
            mode: SliderMode::PitchBend,
            midi_cc: 0,
            midi_channel: 0,
            min_value: 0,
            max_value: 0x3fff,
            strip_mode: StripMode::Retract,
            retraction_speed: 8,
            center_point: 2,
        }
    }

    pub fn to_slot(&self) -> [u8; Self::SLOT_LEN] {
        let mut slot = [0u8; Self::SLOT_LEN];
        match self.mode {
            SliderMode::Off => {}
            SliderMode::Cc => {
                slot[0] = 0x03;
                slot[1] = self.midi_channel;
                slot[2] = self.midi_cc;
                slot[3] = 0x20;
                slot[4..6].copy_from_slice(&self.min_value.to_le_bytes());
                slot[6..8].copy_from_slice(&self.max_value.to_le_bytes());
            }
            SliderMode::PitchBend => {
                // Channel, CC and range are fixed for pitch bend
                slot[0] = 0x06;
                slot[6..8].copy_from_slice(&0x3fffu16.to_le_bytes());
                slot[10] = 0x01;
            }
        }
        slot
    }

    pub fn to_strip_slot(&self) -> [u8; Self::STRIP_SLOT_LEN] {
        let mut slot = [0u8; Self::STRIP_SLOT_LEN];
        slot[..Self::SLOT_LEN].copy_from_slice(&self.to_slot());
        if self.mode != SliderMode::Off {
            slot[12] = self.retraction_speed;
            slot[15] = self.center_point;
        }
        slot
    }
}

/// What a knob sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnobMode {
    Off,
    ProgramChange,
    #[default]
    Cc,
}

impl KnobMode {
    pub const ALL: [KnobMode; 3] = [Self::Off, Self::ProgramChange, Self::Cc];

    pub fn byte(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::ProgramChange => 0x04,
            Self::Cc => 0x03,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::ProgramChange => "PRG",
            Self::Cc => "CC",
        }
    }
}

/// Value range shared by knob and button records
const CONTROL_MIN: u16 = 0;
const CONTROL_MAX: u16 = 0x7f;

/// Knob and button records: four mode bytes, LE min, LE max, 4 zero bytes
const CONTROL_SLOT_LEN: usize = 12;

fn control_slot(byte1: u8, cc: u8, channel: u8, byte2: u8) -> [u8; CONTROL_SLOT_LEN] {
    let mut slot = [0u8; CONTROL_SLOT_LEN];
    slot[0] = byte1;
    slot[1] = cc;
    slot[2] = channel;
    slot[3] = byte2;
    slot[4..6].copy_from_slice(&CONTROL_MIN.to_le_bytes());
    slot[6..8].copy_from_slice(&CONTROL_MAX.to_le_bytes());
    slot
}

/// One of the eight endless knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KnobConfig {
    pub midi_cc: u8,
    pub midi_channel: u8,
    pub mode: KnobMode,
}

impl KnobConfig {
    pub const SLOT_LEN: usize = CONTROL_SLOT_LEN;

    pub fn to_slot(&self) -> [u8; Self::SLOT_LEN] {
        control_slot(self.mode.byte(), self.midi_cc, self.midi_channel, 0x3c)
    }
}

/// What a display button sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonMode {
    Off,
    #[default]
    Toggle,
    Trigger,
    Gate,
    ProgramChange,
}

impl ButtonMode {
    pub const ALL: [ButtonMode; 5] = [
        Self::Off,
        Self::Toggle,
        Self::Trigger,
        Self::Gate,
        Self::ProgramChange,
    ];

    fn byte1(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::ProgramChange => 0x04,
            _ => 0x03,
        }
    }

    fn byte2(self) -> u8 {
        match self {
            Self::Toggle => 0x3c,
            Self::Gate => 0x3e,
            _ => 0x3d,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Toggle => "TOGGLE",
            Self::Trigger => "TRIGGER",
            Self::Gate => "GATE",
            Self::ProgramChange => "PRG",
        }
    }
}

/// One of the eight display buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig {
    pub midi_cc: u8,
    pub midi_channel: u8,
    pub mode: ButtonMode,
    pub color: Color,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            midi_cc: 0,
            midi_channel: 0,
            mode: ButtonMode::Toggle,
            color: Color::White,
        }
    }
}

impl ButtonConfig {
    pub const SLOT_LEN: usize = CONTROL_SLOT_LEN;

    pub fn to_slot(&self) -> [u8; Self::SLOT_LEN] {
        control_slot(
            self.mode.byte1(),
            self.midi_cc,
            self.midi_channel,
            self.mode.byte2(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyzone_slot() {
        let zone = KeyZoneConfig {
            last_key: 60,
            midi_channel: 2,
            transpose: -12,
            velocity: VelocityCurve::Hard1,
            color1: (Color::Red, 1),
            color2: (Color::Green, 3),
            off: false,
        };
        assert_eq!(zone.to_slot(), [60, 0xf4, 2, 0x34, 0x05, 0x1f, 0, 0]);
        assert_eq!(KeyZoneConfig::disabled().to_slot()[3], 0x83);
    }

    #[test]
    fn test_slider_cc_slot() {
        let slider = SliderConfig {
            min_value: 10,
            max_value: 300,
            ..SliderConfig::cc(11, 3)
        };
        assert_eq!(
            slider.to_slot(),
            [0x03, 3, 11, 0x20, 10, 0, 0x2c, 0x01, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_slider_pitch_slot_ignores_cc_fields() {
        let slider = SliderConfig {
            midi_cc: 99,
            midi_channel: 9,
            ..SliderConfig::pitch()
        };
        assert_eq!(
            slider.to_slot(),
            [0x06, 0, 0, 0, 0, 0, 0xff, 0x3f, 0, 0, 0x01, 0]
        );
    }

    #[test]
    fn test_strip_slot_tail() {
        let strip = SliderConfig {
            retraction_speed: 4,
            center_point: 2,
            ..SliderConfig::cc(1, 0)
        };
        assert_eq!(&strip.to_strip_slot()[12..], &[4, 0, 0, 2]);
        assert_eq!(SliderConfig::off().to_strip_slot(), [0u8; 16]);
    }

    #[test]
    fn test_button_and_knob_slots() {
        let button = ButtonConfig {
            midi_cc: 20,
            midi_channel: 1,
            mode: ButtonMode::Gate,
            color: Color::Red,
        };
        assert_eq!(button.to_slot(), [0x03, 20, 1, 0x3e, 0, 0, 0x7f, 0, 0, 0, 0, 0]);
        let prg = ButtonConfig {
            mode: ButtonMode::ProgramChange,
            ..ButtonConfig::default()
        };
        assert_eq!(&prg.to_slot()[..4], &[0x04, 0, 0, 0x3d]);

        let knob = KnobConfig {
            midi_cc: 70,
            midi_channel: 0,
            mode: KnobMode::Cc,
        };
        assert_eq!(knob.to_slot(), [0x03, 70, 0, 0x3c, 0, 0, 0x7f, 0, 0, 0, 0, 0]);
    }
}
