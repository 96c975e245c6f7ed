//! Kontrol GW - Komplete Kontrol keyboard as an Ardour control surface
//!
//! - `kontrol`: HID/USB protocol codec and device link
//! - `osc`: Ardour OSC session and mixer mirror
//! - `router`: view stack, input dispatch and device uploads
//! - `views`: screens and button behavior
//! - `trigger`: coalescing scheduler for redraws and configuration pushes

pub mod config;
pub mod error;
pub mod kontrol;
pub mod osc;
pub mod render;
pub mod router;
pub mod trigger;
pub mod views;

pub use error::{GatewayError, Result};
