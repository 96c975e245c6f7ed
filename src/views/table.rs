//! Tabled editors for the device configuration blocks
//!
//! A [`TableView`] shows a grid of values from a [`TableModel`]: one row per configured
//! control, one column per option. Four columns go on each screen. The big knob moves
//! the cursor (wrapping) and turning it edits the value under the cursor (clamped).

use crate::kontrol::blocks::{
    ButtonMode, KnobMode, SliderConfig, SliderMode, StripMode, VelocityCurve,
};
use crate::kontrol::{Color, ControlId};
use crate::render::Scene;
use crate::router::{DeviceSettings, ViewContext};

use super::{Lighting, LightingMap, ScreenPair, View};

const COLUMNS_PER_SCREEN: usize = 4;

/// Value domain of one table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Inclusive numeric range
    Range(i32, i32),
    /// Enumerated values, stored as an index
    Choice(Vec<&'static str>),
}

impl Field {
    fn clamp(&self, value: i32) -> i32 {
        match self {
            Field::Range(min, max) => value.clamp(*min, *max),
            Field::Choice(labels) => value.clamp(0, labels.len() as i32 - 1),
        }
    }

    fn format(&self, value: i32) -> String {
        match self {
            Field::Range(..) => value.to_string(),
            Field::Choice(labels) => labels
                .get(value as usize)
                .map(|l| l.to_string())
                .unwrap_or_default(),
        }
    }

    fn colors() -> Self {
        Field::Choice(Color::ALL.iter().map(|c| c.name()).collect())
    }
}

/// Rows and columns of one configuration block
pub trait TableModel {
    fn name(&self) -> &'static str;

    fn title(&self) -> &'static str;

    /// Headers of the widest row
    fn headers(&self) -> &'static [&'static str];

    fn row_count(&self, device: &DeviceSettings) -> usize;

    /// Fields of `row`; may be shorter than the headers
    fn fields(&self, row: usize) -> Vec<Field>;

    fn get(&self, device: &DeviceSettings, row: usize, col: usize) -> i32;

    /// Write a value back through the context so the block gets uploaded
    fn set(&self, ctx: &mut ViewContext, row: usize, col: usize, value: i32);
}

pub struct TableView {
    model: Box<dyn TableModel>,
    col: usize,
    row: usize,
}

impl TableView {
    pub fn new(model: Box<dyn TableModel>) -> Self {
        Self {
            model,
            col: 0,
            row: 0,
        }
    }

    /// Cursor as (column, row)
    pub fn cursor(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    fn move_row(&mut self, device: &DeviceSettings, step: isize) {
        let rows = self.model.row_count(device);
        if rows == 0 {
            return;
        }
        self.row = (self.row as isize + step).rem_euclid(rows as isize) as usize;
        let width = self.model.fields(self.row).len();
        self.col = self.col.min(width.saturating_sub(1));
    }

    fn move_col(&mut self, step: isize) {
        let width = self.model.fields(self.row).len();
        if width == 0 {
            return;
        }
        self.col = (self.col as isize + step).rem_euclid(width as isize) as usize;
    }

    fn edit(&mut self, ctx: &mut ViewContext, delta: i32) {
        if self.row >= self.model.row_count(&ctx.device) {
            return;
        }
        let Some(field) = self.model.fields(self.row).into_iter().nth(self.col) else {
            return;
        };
        let current = self.model.get(&ctx.device, self.row, self.col);
        let value = field.clamp(current + delta);
        if value != current {
            self.model.set(ctx, self.row, self.col, value);
        }
    }

    fn screen(&self, device: &DeviceSettings, columns: std::ops::Range<usize>) -> Scene {
        let headers = self.model.headers();
        let rows = (0..self.model.row_count(device))
            .map(|row| {
                let fields = self.model.fields(row);
                columns
                    .clone()
                    .filter_map(|col| {
                        let field = fields.get(col)?;
                        Some(field.format(self.model.get(device, row, col)))
                    })
                    .collect()
            })
            .collect();
        let highlight = columns
            .contains(&self.col)
            .then(|| (self.col - columns.start, self.row));

        Scene::Table {
            title: vec!["NI Ctl".to_string(), self.model.title().to_string()],
            headers: headers
                .iter()
                .skip(columns.start)
                .take(columns.len())
                .map(|h| h.to_string())
                .collect(),
            rows,
            highlight,
        }
    }
}

impl View for TableView {
    fn name(&self) -> &'static str {
        self.model.name()
    }

    fn draw(&mut self, ctx: &ViewContext) -> Option<ScreenPair> {
        let width = self.model.headers().len().max(COLUMNS_PER_SCREEN);
        Some([
            self.screen(&ctx.device, 0..COLUMNS_PER_SCREEN),
            self.screen(&ctx.device, COLUMNS_PER_SCREEN..width),
        ])
    }

    fn button_pressed(&mut self, ctx: &mut ViewContext, control: ControlId) {
        if !ctx.is_topmost() {
            return;
        }
        match control {
            ControlId::BigKnobUp => self.move_row(&ctx.device, -1),
            ControlId::BigKnobDown => self.move_row(&ctx.device, 1),
            ControlId::BigKnobLeft => self.move_col(-1),
            ControlId::BigKnobRight => self.move_col(1),
            ControlId::PrevPage => ctx.unregister_current(),
            _ => return,
        }
        ctx.request_redraw();
    }

    fn big_knob_turned(&mut self, ctx: &mut ViewContext, delta: i32) {
        if ctx.is_topmost() {
            self.edit(ctx, delta);
        }
    }

    fn lighting(&self, _ctx: &ViewContext) -> LightingMap {
        LightingMap::from([
            (ControlId::BigKnobUp, Lighting::new(Color::Blue, 2)),
            (ControlId::BigKnobDown, Lighting::new(Color::Blue, 2)),
            (ControlId::BigKnobLeft, Lighting::new(Color::Blue, 2)),
            (ControlId::BigKnobRight, Lighting::new(Color::Blue, 2)),
            (ControlId::PrevPage, Lighting::new(Color::White, 1)),
        ])
    }
}

/// Index of `item` in `all`, 0 if absent
fn index_of<T: PartialEq>(all: &[T], item: &T) -> i32 {
    all.iter().position(|x| x == item).unwrap_or(0) as i32
}

fn pick<T: Copy>(all: &[T], index: i32) -> T {
    all[(index.max(0) as usize).min(all.len() - 1)]
}

/// First eight key zones
#[derive(Debug, Default)]
pub struct KeyzoneTable;

const KEYZONE_ROWS: usize = 8;

impl TableModel for KeyzoneTable {
    fn name(&self) -> &'static str {
        "keyzones"
    }

    fn title(&self) -> &'static str {
        "Keyzones"
    }

    fn headers(&self) -> &'static [&'static str] {
        &[
            "Last Key",
            "MIDI Channel",
            "Transpose",
            "Velocity",
            "Color 1",
            "Brightness 1",
            "Color 2",
            "Brightness 2",
        ]
    }

    fn row_count(&self, device: &DeviceSettings) -> usize {
        device.keyzones.len().min(KEYZONE_ROWS)
    }

    fn fields(&self, _row: usize) -> Vec<Field> {
        let mut curves: Vec<&'static str> = VelocityCurve::ALL.iter().map(|c| c.label()).collect();
        curves.push("OFF");
        vec![
            Field::Range(0, 127),
            Field::Range(0, 15),
            Field::Range(-25, 25),
            Field::Choice(curves),
            Field::colors(),
            Field::Range(0, 3),
            Field::colors(),
            Field::Range(0, 3),
        ]
    }

    fn get(&self, device: &DeviceSettings, row: usize, col: usize) -> i32 {
        let zone = &device.keyzones[row];
        match col {
            0 => zone.last_key as i32,
            1 => zone.midi_channel as i32,
            2 => zone.transpose as i32,
            3 if zone.off => VelocityCurve::ALL.len() as i32,
            3 => index_of(&VelocityCurve::ALL, &zone.velocity),
            4 => index_of(&Color::ALL, &zone.color1.0),
            5 => zone.color1.1 as i32,
            6 => index_of(&Color::ALL, &zone.color2.0),
            _ => zone.color2.1 as i32,
        }
    }

    fn set(&self, ctx: &mut ViewContext, row: usize, col: usize, value: i32) {
        let mut zones = ctx.device.keyzones.clone();
        let zone = &mut zones[row];
        match col {
            0 => zone.last_key = value as u8,
            1 => zone.midi_channel = value as u8,
            2 => zone.transpose = value as i8,
            3 => {
                zone.off = value as usize >= VelocityCurve::ALL.len();
                if !zone.off {
                    zone.velocity = pick(&VelocityCurve::ALL, value);
                }
            }
            4 => zone.color1.0 = pick(&Color::ALL, value),
            5 => zone.color1.1 = value as u8,
            6 => zone.color2.0 = pick(&Color::ALL, value),
            _ => zone.color2.1 = value as u8,
        }
        ctx.set_keyzones(zones);
    }
}

/// Pitch wheel, mod wheel and touch strip
#[derive(Debug, Default)]
pub struct SliderTable;

const TOUCH_STRIP_ROW: usize = 2;

impl TableModel for SliderTable {
    fn name(&self) -> &'static str {
        "sliders"
    }

    fn title(&self) -> &'static str {
        "Sliders"
    }

    fn headers(&self) -> &'static [&'static str] {
        &[
            "Mode",
            "MIDI Channel",
            "MIDI CC",
            "Min",
            "Max",
            "Strip Mode",
            "Retr/Glide Speed",
            "Center Point",
        ]
    }

    fn row_count(&self, device: &DeviceSettings) -> usize {
        device.sliders.len()
    }

    fn fields(&self, row: usize) -> Vec<Field> {
        let mut fields = vec![
            Field::Choice(SliderMode::ALL.iter().map(|m| m.label()).collect()),
            Field::Range(0, 15),
            Field::Range(0, 127),
            Field::Range(0, 127),
            Field::Range(0, 127),
        ];
        if row == TOUCH_STRIP_ROW {
            fields.extend([
                Field::Choice(StripMode::ALL.iter().map(|m| m.label()).collect()),
                Field::Range(0, 8),
                Field::Range(0, 4),
            ]);
        }
        fields
    }

    fn get(&self, device: &DeviceSettings, row: usize, col: usize) -> i32 {
        let slider = &device.sliders[row];
        match col {
            0 => index_of(&SliderMode::ALL, &slider.mode),
            1 => slider.midi_channel as i32,
            2 => slider.midi_cc as i32,
            3 => slider.min_value as i32,
            4 => slider.max_value as i32,
            5 => index_of(&StripMode::ALL, &slider.strip_mode),
            6 => slider.retraction_speed as i32,
            _ => slider.center_point as i32,
        }
    }

    fn set(&self, ctx: &mut ViewContext, row: usize, col: usize, value: i32) {
        let mut sliders: [SliderConfig; 3] = ctx.device.sliders;
        let slider = &mut sliders[row];
        match col {
            0 => slider.mode = pick(&SliderMode::ALL, value),
            1 => slider.midi_channel = value as u8,
            2 => slider.midi_cc = value as u8,
            3 => slider.min_value = value as u16,
            4 => slider.max_value = value as u16,
            5 => slider.strip_mode = pick(&StripMode::ALL, value),
            6 => slider.retraction_speed = value as u8,
            _ => slider.center_point = value as u8,
        }
        ctx.set_sliders(sliders);
    }
}

/// Which half of the button/knob block a table edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlGroup {
    Buttons,
    Knobs,
}

/// Display buttons or knobs; both live in one configuration block
#[derive(Debug)]
pub struct ButtonKnobTable {
    group: ControlGroup,
}

impl ButtonKnobTable {
    pub fn buttons() -> Self {
        Self {
            group: ControlGroup::Buttons,
        }
    }

    pub fn knobs() -> Self {
        Self {
            group: ControlGroup::Knobs,
        }
    }
}

impl TableModel for ButtonKnobTable {
    fn name(&self) -> &'static str {
        match self.group {
            ControlGroup::Buttons => "buttons",
            ControlGroup::Knobs => "knobs",
        }
    }

    fn title(&self) -> &'static str {
        match self.group {
            ControlGroup::Buttons => "Buttons",
            ControlGroup::Knobs => "Knobs",
        }
    }

    fn headers(&self) -> &'static [&'static str] {
        match self.group {
            ControlGroup::Buttons => &["Mode", "MIDI Channel", "MIDI CC", "Color"],
            ControlGroup::Knobs => &["Mode", "MIDI Channel", "MIDI CC"],
        }
    }

    fn row_count(&self, device: &DeviceSettings) -> usize {
        match self.group {
            ControlGroup::Buttons => device.buttons.len(),
            ControlGroup::Knobs => device.knobs.len(),
        }
    }

    fn fields(&self, _row: usize) -> Vec<Field> {
        match self.group {
            ControlGroup::Buttons => vec![
                Field::Choice(ButtonMode::ALL.iter().map(|m| m.label()).collect()),
                Field::Range(0, 15),
                Field::Range(0, 127),
                Field::colors(),
            ],
            ControlGroup::Knobs => vec![
                Field::Choice(KnobMode::ALL.iter().map(|m| m.label()).collect()),
                Field::Range(0, 15),
                Field::Range(0, 127),
            ],
        }
    }

    fn get(&self, device: &DeviceSettings, row: usize, col: usize) -> i32 {
        match self.group {
            ControlGroup::Buttons => {
                let button = &device.buttons[row];
                match col {
                    0 => index_of(&ButtonMode::ALL, &button.mode),
                    1 => button.midi_channel as i32,
                    2 => button.midi_cc as i32,
                    _ => index_of(&Color::ALL, &button.color),
                }
            }
            ControlGroup::Knobs => {
                let knob = &device.knobs[row];
                match col {
                    0 => index_of(&KnobMode::ALL, &knob.mode),
                    1 => knob.midi_channel as i32,
                    _ => knob.midi_cc as i32,
                }
            }
        }
    }

    fn set(&self, ctx: &mut ViewContext, row: usize, col: usize, value: i32) {
        let mut buttons = ctx.device.buttons;
        let mut knobs = ctx.device.knobs;
        match self.group {
            ControlGroup::Buttons => {
                let button = &mut buttons[row];
                match col {
                    0 => button.mode = pick(&ButtonMode::ALL, value),
                    1 => button.midi_channel = value as u8,
                    2 => button.midi_cc = value as u8,
                    _ => button.color = pick(&Color::ALL, value),
                }
            }
            ControlGroup::Knobs => {
                let knob = &mut knobs[row];
                match col {
                    0 => knob.mode = pick(&KnobMode::ALL, value),
                    1 => knob.midi_channel = value as u8,
                    _ => knob.midi_cc = value as u8,
                }
            }
        }
        ctx.set_buttons_knobs(buttons, knobs);
    }
}

/// Global LED brightness
#[derive(Debug, Default)]
pub struct BrightnessTable;

impl TableModel for BrightnessTable {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn title(&self) -> &'static str {
        "Brightness"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Brightness"]
    }

    fn row_count(&self, _device: &DeviceSettings) -> usize {
        1
    }

    fn fields(&self, _row: usize) -> Vec<Field> {
        vec![Field::Range(0, 127)]
    }

    fn get(&self, device: &DeviceSettings, _row: usize, _col: usize) -> i32 {
        device.brightness as i32
    }

    fn set(&self, ctx: &mut ViewContext, _row: usize, _col: usize, value: i32) {
        ctx.set_brightness(value as u8);
    }
}
