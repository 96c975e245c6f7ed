//! Device configuration pushes

use tracing::debug;

use super::Router;
use crate::error::Result;
use crate::kontrol::codec::{
    encode_brightness, encode_button_knob_config, encode_button_lighting, encode_general_options,
    encode_key_lighting, encode_keyzone_config, encode_slider_config,
};
use crate::kontrol::options::GeneralOptions;

impl Router {
    /// Upload everything that changed since the last push
    ///
    /// Options and lighting are only sent when their encoding differs from the last upload;
    /// each dirty configuration block is sent once and then marked clean.
    pub fn push_device_config(&mut self) -> Result<()> {
        let lighting = encode_button_lighting(&self.build_button_lighting(), &self.ctx.touch_strip);
        let overrides = self.build_general_options();

        let surface = &mut self.surface;
        surface.options.extend(overrides);
        let options = encode_general_options(GeneralOptions::from_map(&surface.options));
        if surface.last_options.as_ref() != Some(&options) {
            debug!("Uploading general options {}", hex::encode(&options));
            surface.sink.send_command(&options)?;
            surface.last_options = Some(options);
        }

        if surface.last_lighting.as_ref() != Some(&lighting) {
            surface.sink.send_command(&lighting)?;
            surface.last_lighting = Some(lighting);
        }

        if let Some(keys) = self.ctx.key_lighting.take() {
            surface.sink.send_command(&encode_key_lighting(&keys))?;
        }

        let device = &mut self.ctx.device;
        if std::mem::take(&mut device.dirty.keyzones) {
            debug!("Uploading keyzone configuration");
            surface.sink.send_command(&encode_keyzone_config(&device.keyzones))?;
        }
        if std::mem::take(&mut device.dirty.sliders) {
            debug!("Uploading slider configuration");
            let [pitch, modulation, strip] = &device.sliders;
            surface
                .sink
                .send_command(&encode_slider_config(pitch, modulation, strip))?;
        }
        if std::mem::take(&mut device.dirty.brightness) {
            debug!("Uploading brightness {}", device.brightness);
            surface.sink.send_command(&encode_brightness(device.brightness))?;
        }
        if std::mem::take(&mut device.dirty.buttons_knobs) {
            debug!("Uploading button/knob configuration");
            surface
                .sink
                .send_command(&encode_button_knob_config(&device.knobs, &device.buttons))?;
        }

        Ok(())
    }
}
