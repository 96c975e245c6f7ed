//! State shared between the router and its views

use rosc::OscType;
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::kontrol::blocks::{ButtonConfig, KeyZoneConfig, KnobConfig, SliderConfig};
use crate::kontrol::codec::{KEY_COUNT, TOUCH_STRIP_LEDS};
use crate::kontrol::{Color, InputSnapshot};
use crate::osc::{MixerSync, OscMixerState};
use crate::trigger::Trigger;
use crate::views::View;

/// Identity of a view on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u64);

/// Device-side configuration blocks that need uploading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags {
    pub keyzones: bool,
    pub sliders: bool,
    pub brightness: bool,
    pub buttons_knobs: bool,
}

impl DirtyFlags {
    pub fn all() -> Self {
        Self {
            keyzones: true,
            sliders: true,
            brightness: true,
            buttons_knobs: true,
        }
    }
}

/// Live copy of the keyboard's RAM configuration
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub keyzones: Vec<KeyZoneConfig>,
    /// Pitch wheel, mod wheel, touch strip
    pub sliders: [SliderConfig; 3],
    pub buttons: [ButtonConfig; 8],
    pub knobs: [KnobConfig; 8],
    pub brightness: u8,
    pub dirty: DirtyFlags,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        let mut keyzones = vec![KeyZoneConfig::default()];
        keyzones.extend(std::iter::repeat(KeyZoneConfig::disabled()).take(11));

        let mut buttons = [ButtonConfig::default(); 8];
        buttons[2].color = Color::Red;

        Self {
            keyzones,
            sliders: [
                SliderConfig::pitch(),
                SliderConfig::cc(0, 0),
                SliderConfig::cc(0, 0),
            ],
            buttons,
            knobs: [KnobConfig::default(); 8],
            brightness: 127,
            // Everything goes out once at startup
            dirty: DirtyFlags::all(),
        }
    }
}

pub(crate) enum StackOp {
    Push(Box<dyn View>),
    Pop(ViewId),
    Replace(Box<dyn View>),
}

/// Everything a view may read or change while handling an event
pub struct ViewContext {
    pub input: InputSnapshot,
    pub device: DeviceSettings,
    pub(crate) mixer: Option<MixerSync>,
    pub(crate) mixer_requested: bool,
    pub(crate) redraw: Trigger,
    pub(crate) config: Trigger,
    pub(crate) pending: Vec<StackOp>,
    pub(crate) current: Option<ViewId>,
    /// Stacked views, base first
    pub(crate) stack: Vec<(ViewId, &'static str)>,
    /// Spliced into every button lighting upload
    pub touch_strip: [u8; TOUCH_STRIP_LEDS],
    pub(crate) key_lighting: Option<[u8; KEY_COUNT]>,
}

impl ViewContext {
    pub(crate) fn new(redraw: Trigger, config: Trigger) -> Self {
        Self {
            input: InputSnapshot::default(),
            device: DeviceSettings::default(),
            mixer: None,
            mixer_requested: false,
            redraw,
            config,
            pending: Vec::new(),
            current: None,
            stack: Vec::new(),
            touch_strip: [0; TOUCH_STRIP_LEDS],
            key_lighting: None,
        }
    }

    pub fn request_redraw(&self) {
        self.redraw.trigger();
    }

    pub fn request_config(&self) {
        self.config.trigger();
    }

    /// Both redraw and configuration push
    pub fn request_update(&self) {
        self.redraw.trigger();
        self.config.trigger();
    }

    /// Push a view once the current event has been dispatched
    pub fn register_view(&mut self, view: Box<dyn View>) {
        self.pending.push(StackOp::Push(view));
    }

    pub fn unregister_view(&mut self, id: ViewId) {
        self.pending.push(StackOp::Pop(id));
    }

    /// Remove the view currently handling an event
    pub fn unregister_current(&mut self) {
        if let Some(id) = self.current {
            self.unregister_view(id);
        }
    }

    /// Drop every overlay and show `view` on top of the base view
    pub fn set_view(&mut self, view: Box<dyn View>) {
        self.pending.push(StackOp::Replace(view));
    }

    /// Whether a view called `name` is on the stack
    pub fn has_view(&self, name: &str) -> bool {
        self.stack.iter().any(|(_, n)| *n == name)
    }

    /// Whether the view handling the current event is the top of the stack
    pub fn is_topmost(&self) -> bool {
        self.current.is_some() && self.stack.last().map(|(id, _)| *id) == self.current
    }

    /// Ask for a mixer session; the owner of the router opens it
    pub fn ensure_mixer(&mut self) {
        if self.mixer.is_none() && !self.mixer_requested {
            debug!("Mixer session requested");
            self.mixer_requested = true;
        }
    }

    pub fn mixer(&self) -> Option<&OscMixerState> {
        self.mixer.as_ref().map(|m| &m.state)
    }

    /// Send `/strip{address}` (or `/master{address}`) for a strip by id
    pub fn send_strip_command(&self, ssid: &str, address: &str, args: Vec<OscType>) -> Result<()> {
        let mixer = self.mixer.as_ref().ok_or(GatewayError::NotConnected)?;
        match mixer.state.strip(ssid) {
            Some(strip) => mixer.send_strip_command(strip, address, args),
            None => mixer.send_strip_command(&crate::osc::StripState::new(ssid), address, args),
        }
    }

    /// Key lights to upload with the next configuration push
    pub fn set_key_lighting(&mut self, keys: [u8; KEY_COUNT]) {
        self.key_lighting = Some(keys);
    }

    pub fn set_keyzones(&mut self, keyzones: Vec<KeyZoneConfig>) {
        self.device.keyzones = keyzones;
        self.device.dirty.keyzones = true;
        self.request_update();
    }

    pub fn set_sliders(&mut self, sliders: [SliderConfig; 3]) {
        self.device.sliders = sliders;
        self.device.dirty.sliders = true;
        self.request_update();
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.device.brightness = brightness;
        self.device.dirty.brightness = true;
        self.request_update();
    }

    pub fn set_buttons_knobs(&mut self, buttons: [ButtonConfig; 8], knobs: [KnobConfig; 8]) {
        self.device.buttons = buttons;
        self.device.knobs = knobs;
        self.device.dirty.buttons_knobs = true;
        self.request_update();
    }
}

#[cfg(test)]
impl ViewContext {
    /// Context whose triggers fire into the void
    pub(crate) fn detached() -> Self {
        use std::sync::Arc;
        use std::time::Duration;

        let idle = || Trigger::new("test", Duration::from_millis(1), Duration::from_millis(2), Arc::new(|| {}));
        Self::new(idle(), idle())
    }

    pub(crate) fn take_pending_names(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|op| match op {
                StackOp::Push(view) => format!("push {}", view.name()),
                StackOp::Pop(id) => format!("pop {}", id.0),
                StackOp::Replace(view) => format!("replace {}", view.name()),
            })
            .collect()
    }
}
