//! Setup menu leading to the configuration tables

use tracing::{info, warn};

use crate::kontrol::{Color, ControlId};
use crate::render::Scene;
use crate::router::ViewContext;

use super::{
    BrightnessTable, ButtonKnobTable, KeyzoneTable, Lighting, LightingMap, ScreenPair,
    SliderTable, TableModel, TableView, View,
};

pub const MENU_OPTIONS: [&str; 7] = [
    "Keyzones",
    "Buttons",
    "Knobs",
    "Sliders",
    "Brightness",
    "Save Configuration",
    "Load Configuration",
];

#[derive(Debug, Default)]
pub struct SetupView {
    highlight: usize,
}

impl SetupView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    fn move_highlight(&mut self, step: i32) {
        let len = MENU_OPTIONS.len() as i32;
        self.highlight = (self.highlight as i32 + step).rem_euclid(len) as usize;
    }

    fn open(&self, ctx: &mut ViewContext) {
        let model: Box<dyn TableModel> = match MENU_OPTIONS[self.highlight] {
            "Keyzones" => Box::new(KeyzoneTable),
            "Buttons" => Box::new(ButtonKnobTable::buttons()),
            "Knobs" => Box::new(ButtonKnobTable::knobs()),
            "Sliders" => Box::new(SliderTable),
            "Brightness" => Box::new(BrightnessTable),
            other => {
                warn!("{} is not supported", other);
                return;
            }
        };
        info!("Opening {} table", model.title());
        ctx.register_view(Box::new(TableView::new(model)));
    }
}

impl View for SetupView {
    fn name(&self) -> &'static str {
        "setup"
    }

    fn draw(&mut self, _ctx: &ViewContext) -> Option<ScreenPair> {
        Some([
            Scene::Menu {
                title: vec!["NI Ctl".to_string(), "Options".to_string()],
                options: MENU_OPTIONS.iter().map(|o| o.to_string()).collect(),
                highlight: self.highlight,
            },
            Scene::Cross,
        ])
    }

    fn button_pressed(&mut self, ctx: &mut ViewContext, control: ControlId) {
        if !ctx.is_topmost() {
            return;
        }
        match control {
            ControlId::BigKnobUp => self.move_highlight(-1),
            ControlId::BigKnobDown => self.move_highlight(1),
            ControlId::BigKnobPush => self.open(ctx),
            _ => return,
        }
        ctx.request_redraw();
    }

    fn big_knob_turned(&mut self, ctx: &mut ViewContext, delta: i32) {
        if !ctx.is_topmost() {
            return;
        }
        self.move_highlight(-delta);
        ctx.request_redraw();
    }

    fn lighting(&self, _ctx: &ViewContext) -> LightingMap {
        LightingMap::from([
            (ControlId::BigKnobUp, Lighting::new(Color::Blue, 2)),
            (ControlId::BigKnobDown, Lighting::new(Color::Blue, 2)),
        ])
    }
}
