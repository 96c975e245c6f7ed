//! Tests for Router module

use super::*;
use crate::error::{GatewayError, Result};
use crate::kontrol::codec::{input_report_fixture, RawInput};
use crate::kontrol::{Color, ControlId};
use crate::osc::testing::{mixer_with_tracks, msg};
use crate::osc::MixerEvent;
use crate::render::{Frame, Scene};
use crate::views::{Lighting, LightingMap, ScreenPair};
use parking_lot::Mutex;
use rosc::OscType;
use std::time::Duration;

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Default)]
struct RecordingSink {
    commands: Arc<Mutex<Vec<Vec<u8>>>>,
    display: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    fn take_commands(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.commands.lock())
    }
}

impl CommandSink for RecordingSink {
    fn send_command(&mut self, command: &[u8]) -> Result<()> {
        self.commands.lock().push(command.to_vec());
        Ok(())
    }

    fn send_display(&mut self, command: &[u8]) -> Result<()> {
        self.display.lock().push(command.to_vec());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    scenes: Arc<Mutex<Vec<Scene>>>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, scene: &Scene) -> Frame {
        self.scenes.lock().push(scene.clone());
        Frame::default()
    }
}

/// View logging every callback it receives
struct ScriptedView {
    name: &'static str,
    scene: Option<Scene>,
    lights: LightingMap,
    pop_on_press: bool,
    log: Log,
}

impl ScriptedView {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            scene: None,
            lights: LightingMap::new(),
            pop_on_press: false,
            log: log.clone(),
        }
    }

    fn drawing(mut self, text: &str) -> Self {
        self.scene = Some(Scene::Banner {
            text: text.to_string(),
            position: None,
        });
        self
    }

    fn lit(mut self, control: ControlId, light: Lighting) -> Self {
        self.lights.insert(control, light);
        self
    }

    fn record(&self, entry: String) {
        self.log.lock().push(format!("{} {}", self.name, entry));
    }
}

impl View for ScriptedView {
    fn name(&self) -> &'static str {
        self.name
    }

    fn enter(&mut self, _ctx: &mut ViewContext) {
        self.record("enter".into());
    }

    fn leave(&mut self, _ctx: &mut ViewContext) {
        self.record("leave".into());
    }

    fn draw(&mut self, _ctx: &ViewContext) -> Option<ScreenPair> {
        self.scene.clone().map(|s| [s.clone(), s])
    }

    fn button_pressed(&mut self, ctx: &mut ViewContext, control: ControlId) {
        self.record(format!("pressed {:?}", control));
        if self.pop_on_press {
            ctx.unregister_current();
        }
    }

    fn button_released(&mut self, _ctx: &mut ViewContext, control: ControlId) {
        self.record(format!("released {:?}", control));
    }

    fn knob_turned(&mut self, _ctx: &mut ViewContext, knob: ControlId, delta: i32) {
        self.record(format!("turned {:?} {}", knob, delta));
    }

    fn mixer_event(&mut self, _ctx: &mut ViewContext, event: &MixerEvent) {
        self.record(format!("mixer {:?}", event));
    }

    fn lighting(&self, _ctx: &ViewContext) -> LightingMap {
        self.lights.clone()
    }
}

struct Harness {
    router: Router,
    sink: RecordingSink,
    scenes: Arc<Mutex<Vec<Scene>>>,
    log: Log,
    refresh_rx: mpsc::UnboundedReceiver<Refresh>,
}

fn harness_with(base: impl FnOnce(&Log) -> ScriptedView) -> Harness {
    let log = Log::default();
    let sink = RecordingSink::default();
    let renderer = RecordingRenderer::default();
    let scenes = renderer.scenes.clone();
    let (tx, refresh_rx) = mpsc::unbounded_channel();
    let router = Router::new(
        Box::new(base(&log)),
        &TimingConfig::default(),
        tx,
        Box::new(sink.clone()),
        Box::new(renderer),
    );
    log.lock().clear();
    Harness {
        router,
        sink,
        scenes,
        log,
        refresh_rx,
    }
}

fn harness() -> Harness {
    harness_with(|log| ScriptedView::new("base", log).drawing("base"))
}

fn boxed(view: impl View + 'static) -> Box<dyn View> {
    Box::new(view)
}

fn report(buttons: &[ControlId], knob1: u16) -> Vec<u8> {
    let mut input = RawInput {
        buttons: buttons.iter().fold(0, |m, c| m | c.input_mask()),
        ..RawInput::default()
    };
    input.knobs[0] = knob1;
    input_report_fixture(&input)
}

fn banner_texts(scenes: &Arc<Mutex<Vec<Scene>>>) -> Vec<String> {
    std::mem::take(&mut *scenes.lock())
        .into_iter()
        .map(|s| match s {
            Scene::Banner { text, .. } => text,
            other => format!("{:?}", other),
        })
        .collect()
}

#[tokio::test]
async fn test_topmost_drawing_view_wins() {
    let mut h = harness();
    let log = h.log.clone();
    let ids = h.router.register_views(vec![
        boxed(ScriptedView::new("overlay", &log).drawing("overlay")),
        boxed(ScriptedView::new("silent", &log)),
    ]);

    h.router.draw().unwrap();
    assert_eq!(banner_texts(&h.scenes), vec!["overlay", "overlay"]);
    assert_eq!(h.sink.display.lock().len(), 2);

    h.router.unregister_views(&[ids[0]]);
    h.router.draw().unwrap();
    assert_eq!(banner_texts(&h.scenes), vec!["base", "base"]);
}

#[tokio::test]
async fn test_screen_upload_is_full_frame() {
    let mut h = harness();
    h.router.draw().unwrap();
    let display = h.sink.display.lock();
    assert_eq!(display[0].len(), 36 + 2 * 480 * 272);
    assert_eq!(display[1][2], 1);
}

#[tokio::test]
async fn test_unregister_skips_unknown_and_base() {
    let mut h = harness();
    let log = h.log.clone();
    let ids = h
        .router
        .register_views(vec![boxed(ScriptedView::new("overlay", &log))]);

    h.router.unregister_views(&[ViewId(99), ViewId(1), ids[0]]);
    assert_eq!(h.router.view_names(), vec!["base"]);
    assert_eq!(
        *log.lock(),
        vec!["overlay enter".to_string(), "overlay leave".to_string()]
    );

    // Already gone
    h.router.unregister_views(&ids);
    assert_eq!(log.lock().len(), 2);
}

#[tokio::test]
async fn test_set_view_replaces_overlays() {
    let mut h = harness();
    let log = h.log.clone();
    h.router.register_views(vec![
        boxed(ScriptedView::new("a", &log)),
        boxed(ScriptedView::new("b", &log)),
    ]);
    h.router.set_view(Box::new(ScriptedView::new("c", &log)));

    assert_eq!(h.router.view_names(), vec!["base", "c"]);
    let log = log.lock();
    assert!(log.contains(&"a leave".to_string()));
    assert!(log.contains(&"b leave".to_string()));
    assert_eq!(log.last().map(String::as_str), Some("c enter"));
}

#[tokio::test]
async fn test_events_reach_every_view_topmost_first() {
    let mut h = harness();
    let log = h.log.clone();
    h.router
        .register_views(vec![boxed(ScriptedView::new("overlay", &log))]);
    log.lock().clear();

    h.router.handle_report(&report(&[ControlId::Mute], 100));
    h.router.handle_report(&report(&[], 110));

    assert_eq!(
        *log.lock(),
        vec![
            "overlay pressed Mute",
            "base pressed Mute",
            "overlay released Mute",
            "base released Mute",
            "overlay turned Knob1 10",
            "base turned Knob1 10",
        ]
    );
}

#[tokio::test]
async fn test_malformed_report_is_dropped() {
    let mut h = harness();
    h.router.handle_report(&[1, 2, 3]);
    h.router.handle_report(&[]);
    assert!(h.log.lock().is_empty());

    // Still treated as the first report afterwards: no turn event
    h.router.handle_report(&report(&[], 500));
    assert!(h.log.lock().is_empty());
}

#[tokio::test]
async fn test_view_can_pop_itself_during_dispatch() {
    let mut h = harness();
    let log = h.log.clone();
    let mut overlay = ScriptedView::new("overlay", &log);
    overlay.pop_on_press = true;
    h.router.register_views(vec![boxed(overlay)]);

    h.router.handle_report(&report(&[ControlId::Stop], 0));
    assert_eq!(h.router.view_names(), vec!["base"]);
    assert_eq!(log.lock().last().map(String::as_str), Some("overlay leave"));
}

#[tokio::test]
async fn test_held_pressable_light_goes_full_brightness() {
    let mut h = harness_with(|log| {
        ScriptedView::new("base", log)
            .lit(ControlId::Mute, Lighting::pressable(Color::Red, 2))
            .lit(ControlId::Solo, Lighting::pressable(Color::Red, 0))
            .lit(ControlId::Play, Lighting::new(Color::Green, 1))
    });

    let lights = h.router.build_button_lighting();
    assert_eq!(lights[&ControlId::Mute], (Color::Red, 2));

    h.router.handle_report(&report(
        &[ControlId::Mute, ControlId::Solo, ControlId::Play],
        0,
    ));
    let lights = h.router.build_button_lighting();
    assert_eq!(lights[&ControlId::Mute], (Color::Red, 3));
    assert_eq!(lights[&ControlId::Solo], (Color::Red, 0));
    assert_eq!(lights[&ControlId::Play], (Color::Green, 1));
}

#[tokio::test]
async fn test_overlay_lighting_overrides_base() {
    let mut h = harness_with(|log| {
        ScriptedView::new("base", log)
            .lit(ControlId::Play, Lighting::new(Color::Green, 1))
            .lit(ControlId::Stop, Lighting::new(Color::White, 1))
    });
    let log = h.log.clone();
    h.router.register_views(vec![boxed(
        ScriptedView::new("overlay", &log).lit(ControlId::Play, Lighting::new(Color::Red, 3)),
    )]);

    let lights = h.router.build_button_lighting();
    assert_eq!(lights[&ControlId::Play], (Color::Red, 3));
    assert_eq!(lights[&ControlId::Stop], (Color::White, 1));
}

#[tokio::test]
async fn test_config_blocks_pushed_once() {
    let mut h = harness();

    h.router.push_device_config().unwrap();
    let first: Vec<u8> = h.sink.take_commands().iter().map(|c| c[0]).collect();
    assert_eq!(first, vec![0xa0, 0x80, 0xa4, 0xa2, 0xf3, 0xa1]);

    h.router.push_device_config().unwrap();
    assert!(h.sink.take_commands().is_empty());

    h.router.ctx.set_brightness(40);
    h.router.ctx.set_brightness(50);
    h.router.push_device_config().unwrap();
    assert_eq!(h.sink.take_commands(), vec![vec![0xf3, 50]]);
}

#[tokio::test]
async fn test_lighting_and_key_lights_follow_changes() {
    let mut h = harness();
    h.router.push_device_config().unwrap();
    h.sink.take_commands();

    h.router.ctx.touch_strip[0] = Color::Red.with_brightness(2);
    h.router.ctx.set_key_lighting([1; 61]);
    h.router.push_device_config().unwrap();

    let commands = h.sink.take_commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0][0], 0x80);
    assert_eq!(commands[0][1 + 44], Color::Red.with_brightness(2));
    assert_eq!(commands[1][0], 0x81);

    h.router.push_device_config().unwrap();
    assert!(h.sink.take_commands().is_empty());
}

#[tokio::test]
async fn test_osc_without_mixer_is_rejected() {
    let mut h = harness();
    let result = h.router.handle_osc(&msg("/session_name", vec![]));
    assert!(matches!(result, Err(GatewayError::NotConnected)));
}

#[tokio::test]
async fn test_mixer_events_are_broadcast() {
    let mut h = harness();
    assert!(!h.router.has_mixer());

    let (sync, _transport) = mixer_with_tracks(&[(1, "Kick")]);
    h.router.attach_mixer(sync);
    assert!(h.router.has_mixer());
    assert_eq!(*h.log.lock(), vec!["base mixer StripList"]);
    h.log.lock().clear();

    h.router
        .handle_osc(&msg("/strip/mute", vec![OscType::Int(1), OscType::Int(1)]))
        .unwrap();
    assert_eq!(*h.log.lock(), vec!["base mixer StripData(\"1\")"]);
    let mixer = h.router.context().mixer().unwrap();
    assert_eq!(mixer.strip("1").and_then(|s| s.muted), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_update_requests_coalesce() {
    let mut h = harness();
    while h.refresh_rx.try_recv().is_ok() {}
    tokio::time::sleep(Duration::from_millis(50)).await;
    while h.refresh_rx.try_recv().is_ok() {}

    for _ in 0..10 {
        h.router.context().request_update();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut fired = Vec::new();
    while let Ok(refresh) = h.refresh_rx.try_recv() {
        fired.push(refresh);
    }
    fired.sort_by_key(|r| *r as u8);
    assert_eq!(fired, vec![Refresh::Redraw, Refresh::DeviceConfig]);
}
