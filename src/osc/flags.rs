//! Bit values of Ardour's `/set_surface` arguments

/// Which strips the surface wants to see
pub mod strip {
    pub const AUDIO_TRACKS: i32 = 1;
    pub const MIDI_TRACKS: i32 = 2;
    pub const AUDIO_BUSSES: i32 = 4;
    pub const MIDI_BUSSES: i32 = 8;
    pub const VCAS: i32 = 16;
    pub const MASTER: i32 = 32;
    pub const MONITOR: i32 = 64;
    pub const FOLDBACK_BUSSES: i32 = 128;
    pub const SELECTED: i32 = 256;
    pub const HIDDEN: i32 = 512;
    pub const USE_GROUP: i32 = 1024;

    /// Everything a mixer page shows
    pub const DEFAULT: i32 =
        AUDIO_TRACKS | MIDI_TRACKS | AUDIO_BUSSES | MIDI_BUSSES | VCAS | MASTER | FOLDBACK_BUSSES;
}

/// Which feedback the peer sends unsolicited
pub mod feedback {
    pub const STRIP_BUTTON_STATUS: i32 = 1;
    pub const STRIP_VARIABLE_CONTROL_VALUES: i32 = 2;
    pub const SSID_PATH_EXTENSION: i32 = 4;
    pub const HEARTBEAT: i32 = 8;
    pub const MASTER_SECTION: i32 = 16;
    pub const BAR_AND_BEAT: i32 = 32;
    pub const TIMECODE: i32 = 64;
    pub const METER_DB: i32 = 128;
    pub const METER_STRIP: i32 = 256;
    pub const SIGNAL_PRESENT: i32 = 512;
    pub const POSITION_IN_SAMPLES: i32 = 1024;
    pub const POSITION_IN_TIME: i32 = 2048;
    pub const SELECT_CHANNEL: i32 = 8192;
    pub const OSC1_REPLY: i32 = 16384;

    pub const DEFAULT: i32 = STRIP_BUTTON_STATUS
        | STRIP_VARIABLE_CONTROL_VALUES
        | HEARTBEAT
        | MASTER_SECTION
        | TIMECODE
        | METER_DB
        | SELECT_CHANNEL
        | OSC1_REPLY;
}

/// Fader/gain reporting mode
pub mod gain_mode {
    pub const GAIN_ONLY: i32 = 0;
    pub const FADER_GAIN_RENAME: i32 = 1;
    pub const FADER_AND_GAIN: i32 = 2;
    pub const FADER_ONLY: i32 = 3;
}
