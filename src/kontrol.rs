//! Komplete Kontrol keyboard protocol
//!
//! Control identity, LED colors, configuration records, the binary command/report codec
//! and the device link carrying them.

pub mod blocks;
pub mod codec;
pub mod color;
pub mod controls;
pub mod device;
pub mod input;
pub mod options;

pub use color::Color;
pub use controls::ControlId;
pub use device::{CommandSink, KontrolDevice};
pub use input::{InputEvent, InputSnapshot};
