//! Views stacked by the router
//!
//! A view reacts to hardware input, may draw both screens, and contributes button
//! lighting and general options. The base [`GlobalView`] is always present; the other
//! views are pushed on top by navigation.

mod global;
mod scanner;
mod setup;
mod strips;
mod table;

pub use global::GlobalView;
pub use scanner::ScannerView;
pub use setup::SetupView;
pub use strips::StripView;
pub use table::{
    BrightnessTable, ButtonKnobTable, ControlGroup, Field, KeyzoneTable, SliderTable, TableModel,
    TableView,
};

use std::collections::HashMap;

use tokio::time::Instant;

use crate::kontrol::options::OptionMap;
use crate::kontrol::{Color, ControlId};
use crate::osc::MixerEvent;
use crate::render::Scene;
use crate::router::ViewContext;

/// Light requested for one control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lighting {
    pub color: Color,
    pub brightness: u8,
    /// Light at full brightness while the control is held
    pub follows_press: bool,
}

impl Lighting {
    pub const OFF: Lighting = Lighting::new(Color::Off, 0);

    pub const fn new(color: Color, brightness: u8) -> Self {
        Self {
            color,
            brightness,
            follows_press: false,
        }
    }

    pub const fn pressable(color: Color, brightness: u8) -> Self {
        Self {
            color,
            brightness,
            follows_press: true,
        }
    }
}

pub type LightingMap = HashMap<ControlId, Lighting>;

/// Contents for the left and right screen
pub type ScreenPair = [Scene; 2];

pub trait View {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn enter(&mut self, _ctx: &mut ViewContext) {}

    fn leave(&mut self, _ctx: &mut ViewContext) {}

    /// Screen contents, or `None` to let the view below draw
    fn draw(&mut self, _ctx: &ViewContext) -> Option<ScreenPair> {
        None
    }

    fn button_pressed(&mut self, _ctx: &mut ViewContext, _control: ControlId) {}

    fn button_released(&mut self, _ctx: &mut ViewContext, _control: ControlId) {}

    fn knob_turned(&mut self, _ctx: &mut ViewContext, _knob: ControlId, _delta: i32) {}

    fn big_knob_turned(&mut self, _ctx: &mut ViewContext, _delta: i32) {}

    fn mixer_event(&mut self, _ctx: &mut ViewContext, _event: &MixerEvent) {}

    /// Animation tick
    fn tick(&mut self, _ctx: &mut ViewContext, _now: Instant) {}

    fn lighting(&self, _ctx: &ViewContext) -> LightingMap {
        LightingMap::new()
    }

    fn general_options(&self) -> OptionMap {
        OptionMap::new()
    }
}
