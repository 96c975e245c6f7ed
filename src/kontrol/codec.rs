//! Wire formats of the keyboard
//!
//! Every command is built from scratch by a pure function. Multi-byte header fields are
//! big-endian, per-control configuration fields are little-endian.

use std::collections::HashMap;

use super::blocks::{ButtonConfig, KeyZoneConfig, KnobConfig, SliderConfig};
use super::color::Color;
use super::controls::{ControlId, LED_COUNT};
use super::options::GeneralOptions;
use crate::error::{GatewayError, Result};

pub const SCREEN_WIDTH: u16 = 480;
pub const SCREEN_HEIGHT: u16 = 272;

pub const KEY_COUNT: usize = 61;
pub const TOUCH_STRIP_LEDS: usize = 25;
pub const KEYZONE_SLOTS: usize = 16;
pub const CONTROL_SLOTS: usize = 8;

pub const INPUT_REPORT_LEN: usize = 32;
const INPUT_REPORT_TAG: u8 = 0x01;

const IMAGE_HEADER: [u8; 8] = [0x84, 0x00, 0x00, 0x60, 0x00, 0x00, 0x00, 0x00];
const IMAGE_BLOCK: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x00];
const IMAGE_FOOTER: [u8; 12] = [
    0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00,
];

/// Bytes of framing around the pixel payload of an image command
pub const IMAGE_OVERHEAD: usize = IMAGE_HEADER.len() + 8 + IMAGE_BLOCK.len() + 2 + IMAGE_FOOTER.len();

/// Screen upload covering a `width`x`height` rectangle at (`x`, `y`)
///
/// `pixels` are RGB565 words in host order, row-major. The device reads pixel words
/// big-endian, so every word is swapped on the way out. A buffer shorter than the
/// rectangle leaves the tail black; extra pixels are ignored.
pub fn encode_image_command(
    screen: u8,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    pixels: &[u16],
) -> Vec<u8> {
    let count = width as usize * height as usize;
    let mut out = Vec::with_capacity(IMAGE_OVERHEAD + 2 * count);

    out.extend_from_slice(&IMAGE_HEADER);
    out[2] = screen;
    for field in [x, y, width, height] {
        out.extend_from_slice(&field.to_be_bytes());
    }
    out.extend_from_slice(&IMAGE_BLOCK);
    // Counted in 32-bit words; wraps for rectangles larger than the device ever takes
    out.extend_from_slice(&((count / 2) as u16).to_be_bytes());

    let start = out.len();
    out.resize(start + 2 * count, 0);
    for (dst, px) in out[start..].chunks_exact_mut(2).zip(pixels) {
        dst.copy_from_slice(&px.to_be_bytes());
    }

    out.extend_from_slice(&IMAGE_FOOTER);
    out
}

/// Full-screen upload
pub fn encode_screen(screen: u8, pixels: &[u16]) -> Vec<u8> {
    encode_image_command(screen, 0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, pixels)
}

/// Button LEDs followed by the touch strip LEDs
///
/// Controls without an LED are skipped, LEDs without an entry stay off. The touch strip
/// part is truncated or zero-padded to its 25 LEDs.
pub fn encode_button_lighting(
    lighting: &HashMap<ControlId, (Color, u8)>,
    touch_strip: &[u8],
) -> Vec<u8> {
    let mut out = vec![0u8; 1 + LED_COUNT + TOUCH_STRIP_LEDS];
    out[0] = 0x80;
    for (control, (color, brightness)) in lighting {
        if let Some(index) = control.led_index() {
            out[1 + index as usize] = color.with_brightness(*brightness);
        }
    }
    let strip = &mut out[1 + LED_COUNT..];
    let n = touch_strip.len().min(TOUCH_STRIP_LEDS);
    strip[..n].copy_from_slice(&touch_strip[..n]);
    out
}

/// Per-key lighting, one packed color byte per key
pub fn encode_key_lighting(keys: &[u8; KEY_COUNT]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + KEY_COUNT);
    out.push(0x81);
    out.extend_from_slice(keys);
    out
}

pub fn encode_general_options(flags: GeneralOptions) -> Vec<u8> {
    let [hi, lo] = flags.0.to_be_bytes();
    vec![0xa0, hi, lo]
}

/// Keyzone table, always exactly 16 zones
pub fn encode_keyzone_config(zones: &[KeyZoneConfig]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + KEYZONE_SLOTS * KeyZoneConfig::SLOT_LEN);
    out.push(0xa4);
    for i in 0..KEYZONE_SLOTS {
        let zone = zones.get(i).copied().unwrap_or_default();
        out.extend_from_slice(&zone.to_slot());
    }
    out
}

pub fn encode_slider_config(
    pitch: &SliderConfig,
    modulation: &SliderConfig,
    touch_strip: &SliderConfig,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 2 * SliderConfig::SLOT_LEN + SliderConfig::STRIP_SLOT_LEN + 4);
    out.push(0xa2);
    out.extend_from_slice(&pitch.to_slot());
    out.extend_from_slice(&modulation.to_slot());
    out.extend_from_slice(&touch_strip.to_strip_slot());
    out.extend_from_slice(&[0u8; 4]);
    out
}

/// Display buttons, knobs and button colors, each list padded or truncated to 8
pub fn encode_button_knob_config(knobs: &[KnobConfig], buttons: &[ButtonConfig]) -> Vec<u8> {
    let buttons: Vec<ButtonConfig> = (0..CONTROL_SLOTS)
        .map(|i| buttons.get(i).copied().unwrap_or_default())
        .collect();

    let mut out = Vec::with_capacity(
        1 + CONTROL_SLOTS * (ButtonConfig::SLOT_LEN + KnobConfig::SLOT_LEN + 1) + 3,
    );
    out.push(0xa1);
    for button in &buttons {
        out.extend_from_slice(&button.to_slot());
    }
    for i in 0..CONTROL_SLOTS {
        let knob = knobs.get(i).copied().unwrap_or_default();
        out.extend_from_slice(&knob.to_slot());
    }
    out.extend(buttons.iter().map(|b| b.color as u8));
    out.extend_from_slice(&[0u8; 3]);
    out
}

/// Global display brightness, 0..=127
pub fn encode_brightness(brightness: u8) -> Vec<u8> {
    vec![0xf3, brightness.min(127)]
}

/// Controls state carried by one input report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawInput {
    /// Pressed-controls bitmask
    pub buttons: u64,
    /// Absolute knob positions, 0..999
    pub knobs: [u16; 8],
    /// Absolute big knob position, 0..15
    pub big_knob: u8,
}

/// Decode a `0x01` controls report
///
/// The byte after the bitmask and the two words after the knobs are not interpreted, nor
/// is the footer.
pub fn decode_input_report(report: &[u8]) -> Result<RawInput> {
    let tag = *report.first().ok_or_else(|| GatewayError::malformed(report))?;
    if tag != INPUT_REPORT_TAG {
        return Err(GatewayError::UnhandledReportKind(tag));
    }
    if report.len() != INPUT_REPORT_LEN {
        return Err(GatewayError::malformed(report));
    }

    let mut mask = [0u8; 8];
    mask.copy_from_slice(&report[1..9]);

    let mut knobs = [0u16; 8];
    for (i, knob) in knobs.iter_mut().enumerate() {
        let at = 10 + 2 * i;
        *knob = u16::from_be_bytes([report[at], report[at + 1]]);
    }

    Ok(RawInput {
        buttons: u64::from_be_bytes(mask),
        knobs,
        big_knob: report[30],
    })
}

#[cfg(test)]
pub(crate) fn input_report_fixture(input: &RawInput) -> Vec<u8> {
    let mut report = vec![0u8; INPUT_REPORT_LEN];
    report[0] = INPUT_REPORT_TAG;
    report[1..9].copy_from_slice(&input.buttons.to_be_bytes());
    for (i, knob) in input.knobs.iter().enumerate() {
        report[10 + 2 * i..12 + 2 * i].copy_from_slice(&knob.to_be_bytes());
    }
    report[30] = input.big_knob;
    report[31] = 0x24;
    report
}
