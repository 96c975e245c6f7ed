//! Sweeping light demo
//!
//! A red dot bounces across the display buttons. Each Scene press adds a stage:
//! 1. the keys light up along the sweep
//! 2. so does the touch strip
//! 3. both screens show a sweeping banner

use std::time::Duration;

use tokio::time::Instant;

use crate::kontrol::codec::{KEY_COUNT, TOUCH_STRIP_LEDS};
use crate::kontrol::options::{GeneralOption, OptionMap};
use crate::kontrol::{Color, ControlId};
use crate::render::Scene;
use crate::router::ViewContext;

use super::{Lighting, LightingMap, ScreenPair, View};

/// Sweep period in hundredths of a second, there and back
const PERIOD: f32 = 199.0;

fn sweep(count: usize, pos: f32) -> Vec<u8> {
    let center = (pos / 100.0 * count as f32).floor() as i64;
    (0..count as i64)
        .map(|i| {
            if (i - center).abs() <= 1 {
                Color::Red.with_brightness(2)
            } else {
                Color::Off.with_brightness(0)
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ScannerView {
    stage: u32,
    /// Sweep position, 0.0..=100.0
    pos: f32,
    started: Option<Instant>,
}

impl ScannerView {
    pub const NAME: &'static str = "scanner";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn position(&self) -> f32 {
        self.pos
    }

    fn position_at(elapsed: Duration) -> f32 {
        let pos = (elapsed.as_secs_f32() * 100.0) % PERIOD;
        if pos >= 100.0 {
            PERIOD - pos
        } else {
            pos
        }
    }
}

impl View for ScannerView {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn leave(&mut self, ctx: &mut ViewContext) {
        ctx.touch_strip = [0; TOUCH_STRIP_LEDS];
        ctx.set_key_lighting([0; KEY_COUNT]);
        ctx.request_config();
    }

    fn draw(&mut self, _ctx: &ViewContext) -> Option<ScreenPair> {
        if self.stage < 3 {
            return Some([Scene::Cross, Scene::Cross]);
        }
        let left = self.pos / 100.0 * 2.0;
        Some([
            Scene::Banner {
                text: "Thank You".to_string(),
                position: Some(left),
            },
            Scene::Banner {
                text: "For Listening".to_string(),
                position: Some(left - 1.0),
            },
        ])
    }

    fn button_pressed(&mut self, ctx: &mut ViewContext, control: ControlId) {
        if control == ControlId::Scene {
            self.stage += 1;
            ctx.request_update();
        }
    }

    fn tick(&mut self, ctx: &mut ViewContext, now: Instant) {
        let started = *self.started.get_or_insert(now);
        self.pos = Self::position_at(now.duration_since(started));

        if self.stage >= 1 {
            let mut keys = [0u8; KEY_COUNT];
            keys.copy_from_slice(&sweep(KEY_COUNT, self.pos));
            ctx.set_key_lighting(keys);
        }
        if self.stage >= 2 {
            ctx.touch_strip.copy_from_slice(&sweep(TOUCH_STRIP_LEDS, self.pos));
        }
        ctx.request_update();
    }

    fn lighting(&self, _ctx: &ViewContext) -> LightingMap {
        let index = ((self.pos / 100.0 * 8.0).floor() as usize).min(7);
        LightingMap::from([(ControlId::BUTTONS[index], Lighting::new(Color::Red, 2))])
    }

    fn general_options(&self) -> OptionMap {
        let mut options = OptionMap::from([(GeneralOption::DisplayButtons, false)]);
        if self.stage >= 1 {
            options.insert(GeneralOption::KeyColorResponse, false);
        }
        if self.stage >= 2 {
            options.insert(GeneralOption::TouchStripOn, false);
        }
        options
    }
}
