//! Mixer strip pages: eight strips per page, four per screen

use rosc::OscType;
use tracing::{debug, warn};

use crate::kontrol::{Color, ControlId};
use crate::osc::{MixerEvent, OscMixerState, StripState};
use crate::render::{Scene, StripCell};
use crate::router::ViewContext;

use super::{Lighting, LightingMap, ScreenPair, View};

pub const STRIPS_PER_PAGE: usize = 8;
const STRIPS_PER_SCREEN: usize = 4;

const FADER_STEP: f32 = 0.002;
const FADER_FINE_STEP: f32 = 0.0002;

#[derive(Debug, Default)]
pub struct StripView {
    /// Strip ids in display order
    strips: Vec<String>,
    highlight: Option<usize>,
    page: usize,
}

impl StripView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strips(&self) -> &[String] {
        &self.strips
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn page(&self) -> usize {
        self.page
    }

    fn set_highlight(&mut self, index: Option<usize>) {
        self.highlight = index;
        if let Some(i) = index {
            self.page = i / STRIPS_PER_PAGE;
        }
    }

    /// Reload the strip order from the mirror, keeping the highlight where possible
    fn rebuild(&mut self, mixer: &OscMixerState) {
        let drawable = mixer.drawable_strips();
        let old_name = self
            .highlight
            .and_then(|i| self.strips.get(i))
            .and_then(|ssid| mixer.strip(ssid))
            .map(|s| s.display_name().to_string());

        let mut highlight = None;
        if let (Some(i), Some(name)) = (self.highlight, old_name.as_deref()) {
            if drawable.get(i).is_some_and(|s| s.display_name() == name) {
                highlight = Some(i);
            } else {
                highlight = drawable.iter().position(|s| s.display_name() == name);
            }
        }
        let highlight = highlight
            .or_else(|| drawable.iter().position(|s| s.selected == Some(true)))
            .unwrap_or(0);

        self.strips = drawable.iter().map(|s| s.ssid.clone()).collect();
        if self.strips.is_empty() {
            self.highlight = None;
            self.page = 0;
        } else {
            self.set_highlight(Some(highlight));
        }
        debug!(
            "Strip list rebuilt: {} strips, highlight {:?}",
            self.strips.len(),
            self.highlight
        );
    }

    fn strip<'a>(&self, ctx: &'a ViewContext, index: usize) -> Option<&'a StripState> {
        let ssid = self.strips.get(index)?;
        ctx.mixer()?.strip(ssid)
    }

    /// Strips a mute/solo press applies to: touched knobs' strips, else the highlighted one
    fn targets(&self, ctx: &ViewContext) -> Vec<usize> {
        let touched: Vec<usize> = ctx
            .input
            .touched_knobs()
            .into_iter()
            .map(|knob| self.page * STRIPS_PER_PAGE + knob)
            .filter(|i| *i < self.strips.len())
            .collect();
        if !touched.is_empty() {
            return touched;
        }
        self.highlight.into_iter().collect()
    }

    fn toggle(&self, ctx: &mut ViewContext, address: &str, read: fn(&StripState) -> Option<bool>) {
        for index in self.targets(ctx) {
            let Some(strip) = self.strip(ctx, index) else {
                continue;
            };
            let value = !read(strip).unwrap_or(false);
            let ssid = strip.ssid.clone();
            if let Err(e) = ctx.send_strip_command(&ssid, address, vec![OscType::Int(value as i32)]) {
                warn!("Failed to send {} for strip {}: {}", address, ssid, e);
            }
        }
    }

    fn move_highlight(&mut self, step: isize) {
        if self.strips.is_empty() {
            return;
        }
        let last = self.strips.len() - 1;
        let target = match self.highlight {
            Some(i) => (i as isize + step).clamp(0, last as isize) as usize,
            None => (self.page * STRIPS_PER_PAGE).min(last),
        };
        self.set_highlight(Some(target));
    }

    fn has_page(&self, page: usize) -> bool {
        page * STRIPS_PER_PAGE < self.strips.len()
    }

    fn change_page(&mut self, forward: bool) {
        let page = if forward {
            self.page + 1
        } else {
            match self.page.checked_sub(1) {
                Some(p) => p,
                None => return,
            }
        };
        if self.has_page(page) {
            self.page = page;
            self.highlight = None;
        }
    }

    fn cells(&self, ctx: &ViewContext, range: std::ops::Range<usize>) -> Vec<StripCell> {
        range
            .filter_map(|i| {
                let strip = self.strip(ctx, i)?;
                Some(StripCell {
                    name: strip.display_name().to_string(),
                    muted: strip.muted.unwrap_or(false),
                    soloed: strip.soloed.unwrap_or(false),
                    rec_enabled: strip.rec_enabled,
                    fader: strip.fader.unwrap_or(0.0),
                    pan: strip.pan_position.unwrap_or(0.5),
                    meter: strip.meter.unwrap_or(f32::NEG_INFINITY),
                    highlighted: self.highlight == Some(i),
                })
            })
            .collect()
    }
}

impl View for StripView {
    fn name(&self) -> &'static str {
        "strips"
    }

    fn enter(&mut self, ctx: &mut ViewContext) {
        if let Some(mixer) = ctx.mixer() {
            self.rebuild(mixer);
        }
    }

    fn draw(&mut self, ctx: &ViewContext) -> Option<ScreenPair> {
        let session = ctx
            .mixer()
            .and_then(|m| m.scalars.session_name.clone())
            .unwrap_or_default();
        let start = self.page * STRIPS_PER_PAGE;
        let mid = start + STRIPS_PER_SCREEN;
        Some([
            Scene::StripBank {
                strips: self.cells(ctx, start..mid),
                session: session.clone(),
            },
            Scene::StripBank {
                strips: self.cells(ctx, mid..mid + STRIPS_PER_SCREEN),
                session,
            },
        ])
    }

    fn button_pressed(&mut self, ctx: &mut ViewContext, control: ControlId) {
        match control {
            ControlId::Mute => self.toggle(ctx, "/mute", |s| s.muted),
            ControlId::Solo => self.toggle(ctx, "/solo", |s| s.soloed),
            ControlId::BigKnobLeft => self.move_highlight(-1),
            ControlId::BigKnobRight => self.move_highlight(1),
            ControlId::BigKnobPush => {
                if let Some(ssid) = self.highlight.and_then(|i| self.strips.get(i)).cloned() {
                    if let Err(e) = ctx.send_strip_command(&ssid, "/select", vec![OscType::Int(1)]) {
                        warn!("Failed to select strip {}: {}", ssid, e);
                    }
                }
            }
            ControlId::NextPage => self.change_page(true),
            ControlId::PrevPage => self.change_page(false),
            other => {
                let Some(button) = other.button_index() else {
                    return;
                };
                let index = self.page * STRIPS_PER_PAGE + button;
                if index < self.strips.len() {
                    self.set_highlight(Some(index));
                }
            }
        }
        ctx.request_redraw();
    }

    fn knob_turned(&mut self, ctx: &mut ViewContext, knob: ControlId, delta: i32) {
        let Some(knob) = knob.knob_index() else {
            return;
        };
        let Some(strip) = self.strip(ctx, self.page * STRIPS_PER_PAGE + knob) else {
            return;
        };
        let step = if ctx.input.is_held(ControlId::Shift) {
            FADER_FINE_STEP
        } else {
            FADER_STEP
        };
        let fader = strip.fader.unwrap_or(0.0) + delta as f32 * step;
        let ssid = strip.ssid.clone();
        if let Err(e) = ctx.send_strip_command(&ssid, "/fader", vec![OscType::Float(fader)]) {
            warn!("Failed to move fader of strip {}: {}", ssid, e);
        }
    }

    fn mixer_event(&mut self, ctx: &mut ViewContext, event: &MixerEvent) {
        if let MixerEvent::StripList = event {
            if let Some(mixer) = ctx.mixer() {
                self.rebuild(mixer);
            }
            ctx.request_update();
        }
    }

    fn lighting(&self, ctx: &ViewContext) -> LightingMap {
        let len = self.strips.len();
        let dim = |on: bool, color: Color| Lighting::new(if on { color } else { Color::Off }, on as u8);

        let mut lights = LightingMap::from([
            (ControlId::PrevPage, dim(self.page > 0, Color::White)),
            (ControlId::NextPage, dim(self.has_page(self.page + 1), Color::White)),
            (
                ControlId::BigKnobLeft,
                dim(self.highlight.is_some_and(|i| i > 0), Color::Blue),
            ),
            (
                ControlId::BigKnobRight,
                dim(self.highlight.is_some_and(|i| i + 1 < len), Color::Blue),
            ),
            (ControlId::Shift, Lighting::pressable(Color::White, 1)),
        ]);

        let highlighted = self.highlight.and_then(|i| self.strip(ctx, i));
        let toggles: [(ControlId, Color, fn(&StripState) -> Option<bool>); 2] = [
            (ControlId::Mute, Color::Cyan, |s| s.muted),
            (ControlId::Solo, Color::YellowOrange, |s| s.soloed),
        ];
        for (control, color, read) in toggles {
            let brightness = match (self.highlight, highlighted) {
                (None, _) => 0,
                (Some(_), Some(strip)) if read(strip) == Some(true) => 2,
                (Some(_), _) => 1,
            };
            lights.insert(control, Lighting::pressable(color, brightness));
        }
        lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::testing::{end_reply, mixer_with_tracks, track_reply, RecordingTransport};

    const TRACKS: [(i32, &str); 10] = [
        (1, "Kick"),
        (2, "Snare"),
        (3, "Bass"),
        (4, "Keys"),
        (5, "Gtr L"),
        (6, "Gtr R"),
        (7, "Vox"),
        (8, "Pad"),
        (9, "FX"),
        (10, "Room"),
    ];

    fn setup() -> (StripView, ViewContext, RecordingTransport) {
        let (sync, transport) = mixer_with_tracks(&TRACKS);
        let mut ctx = ViewContext::detached();
        ctx.mixer = Some(sync);
        let mut view = StripView::new();
        view.enter(&mut ctx);
        (view, ctx, transport)
    }

    #[tokio::test]
    async fn test_enter_lists_strips_in_id_order() {
        let (view, _ctx, _) = setup();
        assert_eq!(view.strips().len(), 10);
        assert_eq!(view.strips()[0], "1");
        assert_eq!(view.strips()[9], "10");
        assert_eq!(view.highlight(), Some(0));
        assert_eq!(view.page(), 0);
    }

    #[tokio::test]
    async fn test_mute_toggles_highlighted_strip() {
        let (mut view, mut ctx, transport) = setup();
        view.button_pressed(&mut ctx, ControlId::Button3);
        view.button_pressed(&mut ctx, ControlId::Mute);

        let sent = transport.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].addr, "/strip/mute");
        assert_eq!(sent[0].args, vec![OscType::Int(3), OscType::Int(1)]);
    }

    #[tokio::test]
    async fn test_solo_applies_to_touched_knobs() {
        let (mut view, mut ctx, transport) = setup();
        ctx.input.raw.buttons = ControlId::Knob2.input_mask() | ControlId::Knob4.input_mask();
        view.button_pressed(&mut ctx, ControlId::Solo);

        let sent = transport.sent.lock();
        let targets: Vec<_> = sent.iter().map(|m| m.args[0].clone()).collect();
        assert_eq!(targets, vec![OscType::Int(2), OscType::Int(4)]);
        // Reported soloed, so the toggle turns it off
        assert_eq!(sent[0].args[1], OscType::Int(0));
    }

    #[tokio::test]
    async fn test_paging_clears_highlight_and_stops_at_last_page() {
        let (mut view, mut ctx, _) = setup();
        view.button_pressed(&mut ctx, ControlId::NextPage);
        assert_eq!(view.page(), 1);
        assert_eq!(view.highlight(), None);

        view.button_pressed(&mut ctx, ControlId::NextPage);
        assert_eq!(view.page(), 1);

        view.button_pressed(&mut ctx, ControlId::BigKnobRight);
        assert_eq!(view.highlight(), Some(8));

        // Display buttons past the end of the list are ignored
        view.button_pressed(&mut ctx, ControlId::Button5);
        assert_eq!(view.highlight(), Some(8));

        view.button_pressed(&mut ctx, ControlId::PrevPage);
        assert_eq!(view.page(), 0);
        view.button_pressed(&mut ctx, ControlId::PrevPage);
        assert_eq!(view.page(), 0);
    }

    #[tokio::test]
    async fn test_highlight_stays_within_list() {
        let (mut view, mut ctx, _) = setup();
        view.button_pressed(&mut ctx, ControlId::BigKnobLeft);
        assert_eq!(view.highlight(), Some(0));
        for _ in 0..20 {
            view.button_pressed(&mut ctx, ControlId::BigKnobRight);
        }
        assert_eq!(view.highlight(), Some(9));
        assert_eq!(view.page(), 1);
    }

    #[tokio::test]
    async fn test_knob_moves_fader_with_fine_mode() {
        let (mut view, mut ctx, transport) = setup();
        view.knob_turned(&mut ctx, ControlId::Knob1, 10);
        ctx.input.raw.buttons = ControlId::Shift.input_mask();
        view.knob_turned(&mut ctx, ControlId::Knob2, 10);

        let sent = transport.sent.lock();
        assert_eq!(sent[0].addr, "/strip/fader");
        assert_eq!(sent[0].args[0], OscType::Int(1));
        match (&sent[0].args[1], &sent[1].args[1]) {
            (OscType::Float(coarse), OscType::Float(fine)) => {
                assert!((coarse - 0.02).abs() < 1e-6);
                assert!((fine - 0.002).abs() < 1e-6);
            }
            other => panic!("unexpected fader args {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_big_knob_push_selects_strip() {
        let (mut view, mut ctx, transport) = setup();
        view.button_pressed(&mut ctx, ControlId::Button2);
        view.button_pressed(&mut ctx, ControlId::BigKnobPush);

        let sent = transport.sent.lock();
        assert_eq!(sent[0].addr, "/strip/select");
        assert_eq!(sent[0].args, vec![OscType::Int(2), OscType::Int(1)]);
    }

    #[tokio::test]
    async fn test_highlight_follows_name_across_refresh() {
        let (mut view, mut ctx, _) = setup();
        view.button_pressed(&mut ctx, ControlId::Button3);
        assert_eq!(view.highlight(), Some(2));

        let mixer = ctx.mixer.as_mut().unwrap();
        mixer.refresh_strip_list().unwrap();
        for (ssid, name) in TRACKS.iter().skip(1) {
            mixer.handle_message(&track_reply(*ssid, name)).unwrap();
        }
        mixer.handle_message(&end_reply()).unwrap();
        view.mixer_event(&mut ctx, &MixerEvent::StripList);

        assert_eq!(view.strips().len(), 9);
        assert_eq!(view.highlight(), Some(1));
        assert_eq!(view.strips()[1], "3");
    }

    #[tokio::test]
    async fn test_empty_list_has_no_highlight() {
        let (sync, _) = mixer_with_tracks(&[]);
        let mut ctx = ViewContext::detached();
        ctx.mixer = Some(sync);
        let mut view = StripView::new();
        view.enter(&mut ctx);
        assert_eq!(view.highlight(), None);

        let lights = view.lighting(&ctx);
        assert_eq!(lights[&ControlId::Mute].brightness, 0);
        assert_eq!(lights[&ControlId::BigKnobRight].color, Color::Off);
    }

    #[tokio::test]
    async fn test_lighting_reflects_highlighted_strip() {
        let (mut view, mut ctx, _) = setup();
        view.button_pressed(&mut ctx, ControlId::Button2);
        let lights = view.lighting(&ctx);

        assert_eq!(lights[&ControlId::Mute], Lighting::pressable(Color::Cyan, 1));
        assert_eq!(lights[&ControlId::Solo], Lighting::pressable(Color::YellowOrange, 2));
        assert_eq!(lights[&ControlId::PrevPage].brightness, 0);
        assert_eq!(lights[&ControlId::NextPage], Lighting::new(Color::White, 1));
        assert_eq!(lights[&ControlId::BigKnobLeft], Lighting::new(Color::Blue, 1));
    }

    #[tokio::test]
    async fn test_next_page_unlit_on_full_last_page() {
        let (sync, _) = mixer_with_tracks(&TRACKS[..8]);
        let mut ctx = ViewContext::detached();
        ctx.mixer = Some(sync);
        let mut view = StripView::new();
        view.enter(&mut ctx);

        let lights = view.lighting(&ctx);
        assert_eq!(lights[&ControlId::NextPage].brightness, 0);
        view.button_pressed(&mut ctx, ControlId::NextPage);
        assert_eq!(view.page(), 0);

        let (mut view, mut ctx, _) = setup();
        view.button_pressed(&mut ctx, ControlId::NextPage);
        let lights = view.lighting(&ctx);
        assert_eq!(lights[&ControlId::NextPage].brightness, 0);
        assert_eq!(lights[&ControlId::PrevPage], Lighting::new(Color::White, 1));
    }
}
