//! Mirror of the remote mixer
//!
//! The peer pushes state one field at a time, so every field starts out unknown. Incoming
//! messages are routed through address tables built once per mirror into typed setters.

use std::collections::HashMap;

use rosc::{OscMessage, OscType};
use tracing::{debug, info, trace, warn};

/// Id under which `/master/*` messages are stored
pub const MASTER_ID: &str = "master";

/// Change notifications for the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixerEvent {
    /// Mixer-wide fields changed
    GeneralData,
    /// Strips appeared or disappeared
    StripList,
    /// One field of the given strip changed
    StripData(String),
}

/// Result of feeding one message into the mirror
#[derive(Debug, Default, PartialEq)]
pub struct MixerUpdate {
    pub events: Vec<MixerEvent>,
    /// Some state changed, structured event or not
    pub changed: bool,
    /// The peer asked for the strip list to be fetched again
    pub refresh_requested: bool,
}

impl MixerUpdate {
    fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    fn with_events(events: Vec<MixerEvent>) -> Self {
        Self {
            events,
            changed: true,
            refresh_requested: false,
        }
    }
}

/// Conversion from one OSC argument
pub trait FromOsc: Sized {
    fn from_osc(arg: &OscType) -> Option<Self>;
}

impl FromOsc for String {
    fn from_osc(arg: &OscType) -> Option<Self> {
        match arg {
            OscType::String(s) => Some(s.clone()),
            OscType::Int(i) => Some(i.to_string()),
            OscType::Long(i) => Some(i.to_string()),
            OscType::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
}

impl FromOsc for bool {
    fn from_osc(arg: &OscType) -> Option<Self> {
        match arg {
            OscType::Bool(b) => Some(*b),
            OscType::Int(i) => Some(*i != 0),
            OscType::Long(i) => Some(*i != 0),
            OscType::Float(f) => Some(*f != 0.0),
            OscType::Double(f) => Some(*f != 0.0),
            _ => None,
        }
    }
}

impl FromOsc for f32 {
    fn from_osc(arg: &OscType) -> Option<Self> {
        match arg {
            OscType::Float(f) => Some(*f),
            OscType::Double(f) => Some(*f as f32),
            OscType::Int(i) => Some(*i as f32),
            OscType::Long(i) => Some(*i as f32),
            _ => None,
        }
    }
}

impl FromOsc for i64 {
    fn from_osc(arg: &OscType) -> Option<Self> {
        match arg {
            OscType::Int(i) => Some(*i as i64),
            OscType::Long(i) => Some(*i),
            OscType::Float(f) => Some(*f as i64),
            OscType::Double(f) => Some(*f as i64),
            _ => None,
        }
    }
}

fn assign<T: FromOsc>(slot: &mut Option<T>, arg: Option<&OscType>) -> bool {
    match arg.and_then(T::from_osc) {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

/// Mixer-wide scalars
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixerScalars {
    pub session_name: Option<String>,
    pub rec_enabled: Option<bool>,
    pub transport_stopped: Option<bool>,
    pub transport_playing: Option<bool>,
    pub ffwd: Option<bool>,
    pub rewind: Option<bool>,
    pub loop_enabled: Option<bool>,
    pub solo_active: Option<bool>,
    pub any_record_active: Option<bool>,
    pub click_active: Option<bool>,
    pub click_level: Option<f32>,
    pub playhead_position: Option<String>,
    // From the end of a strip list
    pub sample_rate: Option<i64>,
    pub current_end_sample: Option<i64>,
    pub monitored: Option<bool>,
}

/// One mixer channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StripState {
    pub ssid: String,
    pub strip_type: Option<String>,
    pub name: Option<String>,
    pub inputs: Option<i64>,
    pub outputs: Option<i64>,
    pub muted: Option<bool>,
    pub soloed: Option<bool>,
    pub rec_enabled: Option<bool>,
    pub gain: Option<f32>,
    pub fader: Option<f32>,
    pub pan_position: Option<f32>,
    pub meter: Option<f32>,
    pub selected: Option<bool>,
    pub expanded: Option<bool>,
    pub group_name: Option<String>,
}

impl StripState {
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            ..Self::default()
        }
    }

    pub fn is_master(&self) -> bool {
        self.ssid == MASTER_ID
    }

    /// Numeric id for on-device paging; master and other named strips have none
    pub fn numeric_id(&self) -> Option<i64> {
        self.ssid.parse().ok()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.ssid)
    }
}

type ScalarSetter = fn(&mut MixerScalars, Option<&OscType>) -> bool;
type StripSetter = fn(&mut StripState, Option<&OscType>) -> bool;

fn scalar_table() -> HashMap<&'static str, ScalarSetter> {
    let entries: [(&'static str, ScalarSetter); 12] = [
        ("/session_name", |s, a| assign(&mut s.session_name, a)),
        ("/rec_enable_toggle", |s, a| assign(&mut s.rec_enabled, a)),
        ("/transport_stop", |s, a| assign(&mut s.transport_stopped, a)),
        ("/transport_play", |s, a| assign(&mut s.transport_playing, a)),
        ("/ffwd", |s, a| assign(&mut s.ffwd, a)),
        ("/rewind", |s, a| assign(&mut s.rewind, a)),
        ("/loop_toggle", |s, a| assign(&mut s.loop_enabled, a)),
        ("/cancel_all_solos", |s, a| assign(&mut s.solo_active, a)),
        ("/record_tally", |s, a| assign(&mut s.any_record_active, a)),
        ("/toggle_click", |s, a| assign(&mut s.click_active, a)),
        ("/click/level", |s, a| assign(&mut s.click_level, a)),
        ("/position/smpte", |s, a| assign(&mut s.playhead_position, a)),
    ];
    entries.into_iter().collect()
}

fn strip_table() -> HashMap<&'static str, StripSetter> {
    let entries: [(&'static str, StripSetter); 11] = [
        ("/expand", |s, a| assign(&mut s.expanded, a)),
        ("/select", |s, a| assign(&mut s.selected, a)),
        ("/name", |s, a| assign(&mut s.name, a)),
        ("/meter", |s, a| assign(&mut s.meter, a)),
        ("/group", |s, a| assign(&mut s.group_name, a)),
        ("/mute", |s, a| assign(&mut s.muted, a)),
        ("/solo", |s, a| assign(&mut s.soloed, a)),
        ("/recenable", |s, a| assign(&mut s.rec_enabled, a)),
        ("/gain", |s, a| assign(&mut s.gain, a)),
        ("/fader", |s, a| assign(&mut s.fader, a)),
        ("/pan_stereo_position", |s, a| assign(&mut s.pan_position, a)),
    ];
    entries.into_iter().collect()
}

/// Best-effort copy of the remote mixer
pub struct OscMixerState {
    pub scalars: MixerScalars,
    strips: HashMap<String, StripState>,
    /// Last complete strip map, kept while a refresh rebuilds `strips`
    previous: Option<HashMap<String, StripState>>,
    scalar_setters: HashMap<&'static str, ScalarSetter>,
    strip_setters: HashMap<&'static str, StripSetter>,
}

impl Default for OscMixerState {
    fn default() -> Self {
        Self::new()
    }
}

impl OscMixerState {
    pub fn new() -> Self {
        Self {
            scalars: MixerScalars::default(),
            strips: HashMap::new(),
            previous: None,
            scalar_setters: scalar_table(),
            strip_setters: strip_table(),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.previous.is_some()
    }

    /// Strip map readers should see: the last complete one
    fn visible(&self) -> &HashMap<String, StripState> {
        self.previous.as_ref().unwrap_or(&self.strips)
    }

    pub fn strip(&self, ssid: &str) -> Option<&StripState> {
        self.visible().get(ssid)
    }

    pub fn master(&self) -> Option<&StripState> {
        self.strip(MASTER_ID)
    }

    /// Strips with numeric ids, ordered by id
    pub fn drawable_strips(&self) -> Vec<&StripState> {
        let mut strips: Vec<&StripState> = self
            .visible()
            .values()
            .filter(|s| s.numeric_id().is_some())
            .collect();
        strips.sort_by_key(|s| s.numeric_id());
        strips
    }

    /// Start rebuilding the strip list; the caller sends `/strip/list`
    pub fn begin_refresh(&mut self) {
        // A refresh interrupting another one keeps the last complete map
        let previous = match self.previous.take() {
            Some(previous) => previous,
            None => std::mem::take(&mut self.strips),
        };
        self.strips.clear();
        if let Some(master) = previous.get(MASTER_ID) {
            self.strips.insert(MASTER_ID.to_string(), master.clone());
        }
        self.previous = Some(previous);
        info!("Refreshing strip list");
    }

    /// Apply one message from the peer
    pub fn handle_message(&mut self, msg: &OscMessage) -> MixerUpdate {
        let addr = msg.addr.as_str();

        if addr == "/heartbeat" || addr.starts_with("/select/") {
            return MixerUpdate::default();
        }
        if addr == "/reply" {
            return self.on_reply(&msg.args);
        }
        if let Some(rest) = addr.strip_prefix("/master") {
            if rest.starts_with('/') {
                return self.on_strip_message(MASTER_ID.to_string(), rest, &msg.args);
            }
        }
        if let Some(rest) = addr.strip_prefix("/strip") {
            if rest.starts_with('/') {
                let Some(ssid) = msg.args.first().and_then(String::from_osc) else {
                    if rest == "/list" {
                        return MixerUpdate {
                            refresh_requested: true,
                            ..MixerUpdate::default()
                        };
                    }
                    trace!("Strip message without id: {}", addr);
                    return MixerUpdate::default();
                };
                return self.on_strip_message(ssid, rest, &msg.args[1..]);
            }
        }
        if let Some(setter) = self.scalar_setters.get(addr) {
            if setter(&mut self.scalars, msg.args.first()) {
                debug!("{} = {:?}", addr, msg.args.first());
                return MixerUpdate::changed();
            }
            warn!("Unexpected arguments for {}: {:?}", addr, msg.args);
            return MixerUpdate::default();
        }

        trace!("Unhandled OSC message {} {:?}", addr, msg.args);
        MixerUpdate::default()
    }

    fn on_strip_message(&mut self, ssid: String, field: &str, args: &[OscType]) -> MixerUpdate {
        let mut events = Vec::new();
        if !self.strips.contains_key(&ssid) {
            self.strips.insert(ssid.clone(), StripState::new(ssid.clone()));
            if !self.is_refreshing() {
                events.push(MixerEvent::StripList);
            }
        }

        let Some(setter) = self.strip_setters.get(field) else {
            trace!("Unhandled strip field {} for {}", field, ssid);
            return if events.is_empty() {
                MixerUpdate::default()
            } else {
                MixerUpdate::with_events(events)
            };
        };

        let applied = self
            .strips
            .get_mut(&ssid)
            .map(|strip| setter(strip, args.first()))
            .unwrap_or(false);
        if applied {
            trace!("{}: {} = {:?}", ssid, field, args.first());
            // Mirror into the snapshot readers see, so the view reflects live changes mid-refresh
            if let Some(previous) = self.previous.as_mut() {
                if let Some(strip) = previous.get_mut(&ssid) {
                    setter(strip, args.first());
                }
            }
            events.push(MixerEvent::StripData(ssid));
        } else {
            warn!("{} ({}): missing or invalid value {:?}", field, ssid, args);
        }

        if events.is_empty() {
            MixerUpdate::default()
        } else {
            MixerUpdate::with_events(events)
        }
    }

    fn on_reply(&mut self, args: &[OscType]) -> MixerUpdate {
        if let Some(OscType::String(tag)) = args.first() {
            if tag == "end_route_list" {
                return self.finish_refresh(&args[1..]);
            }
        }

        let (bus, ssid_index) = match args.len() {
            8 => (false, 6),
            7 => (true, 6),
            n => {
                warn!("Strip list entry with {} arguments: {:?}", n, args);
                return MixerUpdate::default();
            }
        };
        let Some(ssid) = String::from_osc(&args[ssid_index]) else {
            warn!("Strip list entry without id: {:?}", args);
            return MixerUpdate::default();
        };

        let strip = self
            .strips
            .entry(ssid.clone())
            .or_insert_with(|| StripState::new(ssid.clone()));
        assign(&mut strip.strip_type, args.first());
        assign(&mut strip.name, args.get(1));
        assign(&mut strip.inputs, args.get(2));
        assign(&mut strip.outputs, args.get(3));
        assign(&mut strip.muted, args.get(4));
        assign(&mut strip.soloed, args.get(5));
        if !bus {
            assign(&mut strip.rec_enabled, args.get(7));
        }
        info!("Refresh entry {} {}", ssid, strip.display_name());

        MixerUpdate::changed()
    }

    fn finish_refresh(&mut self, args: &[OscType]) -> MixerUpdate {
        assign(&mut self.scalars.sample_rate, args.first());
        assign(&mut self.scalars.current_end_sample, args.get(1));
        assign(&mut self.scalars.monitored, args.get(2));
        self.previous = None;
        info!("Strip list refreshed: {} strips", self.strips.len());
        MixerUpdate::with_events(vec![MixerEvent::StripList, MixerEvent::GeneralData])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::testing::{end_reply, msg, track_reply};

    fn drawable_ids(state: &OscMixerState) -> Vec<String> {
        state
            .drawable_strips()
            .iter()
            .map(|s| s.ssid.clone())
            .collect()
    }

    #[test]
    fn test_refresh_scenario() {
        let mut state = OscMixerState::new();
        state.handle_message(&msg("/master/fader", vec![OscType::Float(0.8)]));
        state.handle_message(&msg(
            "/strip/name",
            vec![OscType::Int(9), OscType::String("old".into())],
        ));

        state.begin_refresh();
        let mut events = Vec::new();
        events.extend(state.handle_message(&track_reply(1, "Kick")).events);
        // Readers still see the last complete list mid-refresh
        assert_eq!(drawable_ids(&state), vec!["9"]);
        events.extend(state.handle_message(&track_reply(2, "Snare")).events);
        events.extend(state.handle_message(&end_reply()).events);

        assert_eq!(events, vec![MixerEvent::StripList, MixerEvent::GeneralData]);
        assert!(!state.is_refreshing());
        assert_eq!(drawable_ids(&state), vec!["1", "2"]);
        assert_eq!(state.master().and_then(|m| m.fader), Some(0.8));
        assert_eq!(state.strip("2").and_then(|s| s.name.clone()), Some("Snare".into()));
        assert_eq!(state.strip("1").and_then(|s| s.rec_enabled), Some(true));
        assert_eq!(state.scalars.sample_rate, Some(48000));
        assert_eq!(state.scalars.monitored, Some(false));
    }

    #[test]
    fn test_bus_reply_has_no_rec_enable() {
        let mut state = OscMixerState::new();
        state.begin_refresh();
        let mut args = track_reply(5, "Bus").args;
        args.pop();
        state.handle_message(&msg("/reply", args));
        state.handle_message(&end_reply());
        assert_eq!(state.strip("5").and_then(|s| s.rec_enabled), None);
        assert_eq!(state.strip("5").and_then(|s| s.soloed), Some(true));
    }

    #[test]
    fn test_strip_mute() {
        let mut state = OscMixerState::new();
        state.handle_message(&msg("/strip/mute", vec![OscType::Int(3), OscType::Int(0)]));

        let update = state.handle_message(&msg("/strip/mute", vec![OscType::Int(3), OscType::Int(1)]));
        assert_eq!(update.events, vec![MixerEvent::StripData("3".into())]);
        assert_eq!(state.strip("3").and_then(|s| s.muted), Some(true));
    }

    #[test]
    fn test_unknown_strip_announces_list_change() {
        let mut state = OscMixerState::new();
        let update = state.handle_message(&msg("/strip/fader", vec![OscType::Int(4), OscType::Float(0.5)]));
        assert_eq!(
            update.events,
            vec![MixerEvent::StripList, MixerEvent::StripData("4".into())]
        );

        state.begin_refresh();
        let update = state.handle_message(&msg("/strip/fader", vec![OscType::Int(7), OscType::Float(0.5)]));
        assert_eq!(update.events, vec![MixerEvent::StripData("7".into())]);
    }

    #[test]
    fn test_strip_list_request_and_ignored_addresses() {
        let mut state = OscMixerState::new();
        assert!(state.handle_message(&msg("/strip/list", vec![])).refresh_requested);
        assert_eq!(state.handle_message(&msg("/heartbeat", vec![OscType::Float(1.0)])), MixerUpdate::default());
        assert_eq!(
            state.handle_message(&msg("/select/name", vec![OscType::String("x".into())])),
            MixerUpdate::default()
        );
        assert_eq!(state.handle_message(&msg("/nonsense", vec![])), MixerUpdate::default());
    }

    #[test]
    fn test_scalar_updates() {
        let mut state = OscMixerState::new();
        let update = state.handle_message(&msg("/session_name", vec![OscType::String("song".into())]));
        assert!(update.changed);
        assert!(update.events.is_empty());
        state.handle_message(&msg("/transport_play", vec![OscType::Int(1)]));
        state.handle_message(&msg("/click/level", vec![OscType::Float(0.25)]));

        assert_eq!(state.scalars.session_name.as_deref(), Some("song"));
        assert_eq!(state.scalars.transport_playing, Some(true));
        assert_eq!(state.scalars.click_level, Some(0.25));
        assert!(!state.handle_message(&msg("/ffwd", vec![])).changed);
    }

    #[test]
    fn test_drawable_strips_exclude_named_ids() {
        let mut state = OscMixerState::new();
        for ssid in [10, 2, 1] {
            state.handle_message(&msg("/strip/mute", vec![OscType::Int(ssid), OscType::Int(0)]));
        }
        state.handle_message(&msg("/master/mute", vec![OscType::Int(0)]));
        assert_eq!(drawable_ids(&state), vec!["1", "2", "10"]);
        assert!(state.master().is_some());
    }
}
