//! General device options
//!
//! A handful of global switches packed into one big-endian bitfield.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneralOption {
    /// Touch strip sends MIDI
    TouchStripOn,
    /// Key lights follow the keyzone colors on press
    KeyColorResponse,
    /// Octave buttons light up when shifted
    OctaveShiftKeys,
    /// Display buttons light up with their configured color
    DisplayButtons,
    /// Knobs report through the HID input report only
    KnobsHidDisable,
    /// Wheels report through the HID input report as well
    WheelsHidEnable,
}

impl GeneralOption {
    pub const ALL: [GeneralOption; 6] = [
        Self::TouchStripOn,
        Self::KeyColorResponse,
        Self::OctaveShiftKeys,
        Self::DisplayButtons,
        Self::KnobsHidDisable,
        Self::WheelsHidEnable,
    ];

    pub fn bit(self) -> u16 {
        match self {
            Self::TouchStripOn => 0x1000,
            Self::KeyColorResponse => 0x8000,
            Self::OctaveShiftKeys => 0x0004,
            Self::DisplayButtons => 0x0100,
            Self::KnobsHidDisable => 0x0200,
            Self::WheelsHidEnable => 0x0008,
        }
    }
}

/// Option values contributed by the view stack, later writers win
pub type OptionMap = BTreeMap<GeneralOption, bool>;

/// Options the base view starts from
pub fn default_options() -> OptionMap {
    OptionMap::from([
        (GeneralOption::DisplayButtons, true),
        (GeneralOption::KeyColorResponse, true),
        (GeneralOption::KnobsHidDisable, true),
        (GeneralOption::TouchStripOn, true),
        (GeneralOption::OctaveShiftKeys, false),
    ])
}

/// Packed option bitfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneralOptions(pub u16);

impl GeneralOptions {
    pub fn from_map(map: &OptionMap) -> Self {
        Self(
            map.iter()
                .filter(|(_, enabled)| **enabled)
                .fold(0, |flags, (option, _)| flags | option.bit()),
        )
    }

    pub fn contains(self, option: GeneralOption) -> bool {
        self.0 & option.bit() != 0
    }
}
