//! Aggregation of per-view lighting and option contributions

use std::collections::HashMap;

use super::Router;
use crate::kontrol::color::MAX_BRIGHTNESS;
use crate::kontrol::options::OptionMap;
use crate::kontrol::{Color, ControlId};
use crate::views::LightingMap;

impl Router {
    /// Final button lighting: views base first, higher views overriding lower ones
    ///
    /// A light that follows presses goes to full brightness while its control is held,
    /// except when its brightness is zero.
    pub fn build_button_lighting(&self) -> HashMap<ControlId, (Color, u8)> {
        let mut merged = LightingMap::new();
        for (_, view) in &self.views {
            merged.extend(view.lighting(&self.ctx));
        }

        merged
            .into_iter()
            .map(|(control, light)| {
                let brightness = if light.follows_press
                    && light.brightness != 0
                    && self.ctx.input.is_held(control)
                {
                    MAX_BRIGHTNESS
                } else {
                    light.brightness
                };
                (control, (light.color, brightness))
            })
            .collect()
    }

    /// Option overrides of all views, base first
    pub fn build_general_options(&self) -> OptionMap {
        let mut merged = OptionMap::new();
        for (_, view) in &self.views {
            merged.extend(view.general_options());
        }
        merged
    }
}
