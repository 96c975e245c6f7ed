//! Physical control identity
//!
//! Every button, knob touch sensor and big-knob direction has a fixed position in the
//! 64-bit pressed-controls bitmask of the input report, and most buttons have an LED slot
//! in the lighting command.

/// Number of individually addressable button LEDs in the lighting command
pub const LED_COUNT: usize = 44;

/// Physical control on the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlId {
    FixedVelTsMode,
    OctaveRight,
    OctaveLeft,
    Shift,
    Scale,
    Arp,
    UndoRedo,
    Quantize,
    Auto,
    Loop,
    Metro,
    Tempo,
    Play,
    Record,
    Stop,
    Mute,
    Solo,
    PresetUp,
    PresetDown,
    PrevPage,
    NextPage,
    Scene,
    Pattern,
    Track,
    KeyMode,
    Clear,

    Knob1,
    Knob2,
    Knob3,
    Knob4,
    Knob5,
    Knob6,
    Knob7,
    Knob8,

    Button1,
    Button2,
    Button3,
    Button4,
    Button5,
    Button6,
    Button7,
    Button8,

    Browser,
    Plugin,
    Mixer,
    Instance,
    Midi,
    Setup,

    BigKnobTouch,
    BigKnobPush,

    BigKnobUp,
    BigKnobLeft,
    BigKnobRight,
    BigKnobDown,
}

/// Input mask (as a big-endian u64) and LED index, indexed by `ControlId as usize`
static CONTROL_TABLE: [(u64, Option<u8>); 54] = [
    (0x0000_0000_0000_0004, Some(41)), // FixedVelTsMode
    (0x0000_0000_0000_0002, Some(43)), // OctaveRight
    (0x0000_0000_0000_0001, Some(42)), // OctaveLeft
    (0x0080_0000_0000_0000, Some(14)), // Shift
    (0x0008_0000_0000_0000, Some(15)), // Scale
    (0x0004_0000_0000_0000, Some(16)), // Arp
    (0x0040_0000_0000_0000, Some(18)), // UndoRedo
    (0x0002_0000_0000_0000, Some(19)), // Quantize
    (0x0001_0000_0000_0000, Some(20)), // Auto
    (0x0020_0000_0000_0000, Some(24)), // Loop
    (0x0000_0800_0000_0000, Some(25)), // Metro
    (0x0000_0400_0000_0000, Some(26)), // Tempo
    (0x0010_0000_0000_0000, Some(29)), // Play
    (0x0000_0200_0000_0000, Some(30)), // Record
    (0x0000_0100_0000_0000, Some(31)), // Stop
    (0x0000_0001_0000_0000, Some(0)),  // Mute
    (0x0000_0002_0000_0000, Some(1)),  // Solo
    (0x0000_1000_0000_0000, Some(22)), // PresetUp
    (0x0000_4000_0000_0000, Some(27)), // PresetDown
    (0x0000_8000_0000_0000, Some(32)), // PrevPage
    (0x0000_2000_0000_0000, Some(33)), // NextPage
    (0x0000_0004_0000_0000, Some(17)), // Scene
    (0x0000_0008_0000_0000, Some(21)), // Pattern
    (0x0000_0010_0000_0000, Some(23)), // Track
    (0x0000_0040_0000_0000, Some(28)), // KeyMode
    (0x0000_0020_0000_0000, Some(34)), // Clear
    (0x0000_0000_0000_8000, None),     // Knob1
    (0x0000_0000_0000_4000, None),     // Knob2
    (0x0000_0000_0000_2000, None),     // Knob3
    (0x0000_0000_0000_1000, None),     // Knob4
    (0x0000_0000_0000_0800, None),     // Knob5
    (0x0000_0000_0000_0400, None),     // Knob6
    (0x0000_0000_0000_0200, None),     // Knob7
    (0x0000_0000_0000_0100, None),     // Knob8
    (0x1000_0000_0000_0000, Some(2)),  // Button1
    (0x2000_0000_0000_0000, Some(3)),  // Button2
    (0x4000_0000_0000_0000, Some(4)),  // Button3
    (0x8000_0000_0000_0000, Some(5)),  // Button4
    (0x0100_0000_0000_0000, Some(6)),  // Button5
    (0x0200_0000_0000_0000, Some(7)),  // Button6
    (0x0400_0000_0000_0000, Some(8)),  // Button7
    (0x0800_0000_0000_0000, Some(9)),  // Button8
    (0x0000_0000_0400_0000, Some(35)), // Browser
    (0x0000_0000_0200_0000, Some(36)), // Plugin
    (0x0000_0000_0100_0000, Some(37)), // Mixer
    (0x0000_0000_1000_0000, Some(38)), // Instance
    (0x0000_0000_2000_0000, Some(39)), // Midi
    (0x0000_0000_0800_0000, Some(40)), // Setup
    (0x0000_0000_0004_0000, None),     // BigKnobTouch
    (0x0000_0000_0008_0000, None),     // BigKnobPush
    (0x0000_0000_0020_0000, Some(11)), // BigKnobUp
    (0x0000_0000_0010_0000, Some(10)), // BigKnobLeft
    (0x0000_0000_0080_0000, Some(13)), // BigKnobRight
    (0x0000_0000_0040_0000, Some(12)), // BigKnobDown
];

impl ControlId {
    /// All controls in declaration order (the order press/release events are emitted in)
    pub const ALL: [ControlId; 54] = [
        Self::FixedVelTsMode,
        Self::OctaveRight,
        Self::OctaveLeft,
        Self::Shift,
        Self::Scale,
        Self::Arp,
        Self::UndoRedo,
        Self::Quantize,
        Self::Auto,
        Self::Loop,
        Self::Metro,
        Self::Tempo,
        Self::Play,
        Self::Record,
        Self::Stop,
        Self::Mute,
        Self::Solo,
        Self::PresetUp,
        Self::PresetDown,
        Self::PrevPage,
        Self::NextPage,
        Self::Scene,
        Self::Pattern,
        Self::Track,
        Self::KeyMode,
        Self::Clear,
        Self::Knob1,
        Self::Knob2,
        Self::Knob3,
        Self::Knob4,
        Self::Knob5,
        Self::Knob6,
        Self::Knob7,
        Self::Knob8,
        Self::Button1,
        Self::Button2,
        Self::Button3,
        Self::Button4,
        Self::Button5,
        Self::Button6,
        Self::Button7,
        Self::Button8,
        Self::Browser,
        Self::Plugin,
        Self::Mixer,
        Self::Instance,
        Self::Midi,
        Self::Setup,
        Self::BigKnobTouch,
        Self::BigKnobPush,
        Self::BigKnobUp,
        Self::BigKnobLeft,
        Self::BigKnobRight,
        Self::BigKnobDown,
    ];

    /// The eight touch-sensitive knobs, left to right
    pub const KNOBS: [ControlId; 8] = [
        Self::Knob1,
        Self::Knob2,
        Self::Knob3,
        Self::Knob4,
        Self::Knob5,
        Self::Knob6,
        Self::Knob7,
        Self::Knob8,
    ];

    /// The eight buttons above the screens, left to right
    pub const BUTTONS: [ControlId; 8] = [
        Self::Button1,
        Self::Button2,
        Self::Button3,
        Self::Button4,
        Self::Button5,
        Self::Button6,
        Self::Button7,
        Self::Button8,
    ];

    /// Bit of this control in the pressed-controls bitmask
    pub fn input_mask(self) -> u64 {
        CONTROL_TABLE[self as usize].0
    }

    /// Position of this control's LED in the lighting command, if it has one
    pub fn led_index(self) -> Option<u8> {
        CONTROL_TABLE[self as usize].1
    }

    /// Index 0..8 if this is one of the eight knobs
    pub fn knob_index(self) -> Option<usize> {
        Self::KNOBS.iter().position(|k| *k == self)
    }

    /// Index 0..8 if this is one of the eight display buttons
    pub fn button_index(self) -> Option<usize> {
        Self::BUTTONS.iter().position(|b| *b == self)
    }

    /// Whether this control is held in the given bitmask
    pub fn is_set_in(self, mask: u64) -> bool {
        mask & self.input_mask() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_matches_declaration_order() {
        for (i, control) in ControlId::ALL.iter().enumerate() {
            assert_eq!(*control as usize, i, "{:?} out of order", control);
        }
    }

    #[test]
    fn test_masks_are_single_bits_and_disjoint() {
        let mut seen = 0u64;
        for control in ControlId::ALL {
            let mask = control.input_mask();
            assert_eq!(mask.count_ones(), 1, "{:?}", control);
            assert_eq!(seen & mask, 0, "{:?} overlaps", control);
            seen |= mask;
        }
    }

    #[test]
    fn test_led_indices_are_unique_and_in_range() {
        let mut seen = HashSet::new();
        for control in ControlId::ALL {
            if let Some(index) = control.led_index() {
                assert!((index as usize) < LED_COUNT);
                assert!(seen.insert(index), "duplicate LED index {}", index);
            }
        }
        assert_eq!(seen.len(), LED_COUNT);
    }

    #[test]
    fn test_knob_and_button_indices() {
        assert_eq!(ControlId::Knob1.knob_index(), Some(0));
        assert_eq!(ControlId::Knob8.knob_index(), Some(7));
        assert_eq!(ControlId::Button5.button_index(), Some(4));
        assert_eq!(ControlId::Mute.knob_index(), None);
        assert_eq!(ControlId::Knob3.led_index(), None);
    }
}
