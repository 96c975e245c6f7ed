//! Error taxonomy shared by the device codec, the mixer session and the router.

use thiserror::Error;

/// Errors surfaced by the gateway library
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Input report with a known tag but an unexpected layout
    #[error("malformed input report ({len} bytes): {hex}")]
    MalformedReport { len: usize, hex: String },

    /// Input report whose leading tag byte is not understood
    #[error("unhandled input report kind 0x{0:02x}")]
    UnhandledReportKind(u8),

    /// The OSC transport closed underneath an active session
    #[error("OSC connection lost")]
    ConnectionLost,

    /// The keyboard reader stopped delivering reports
    #[error("keyboard input lost")]
    DeviceLost,

    /// An operation needing a mixer session was invoked before one exists
    #[error("not connected to a mixer")]
    NotConnected,

    #[error("OSC error: {0}")]
    Osc(String),

    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("frame dump failed: {0}")]
    FrameDump(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub(crate) fn malformed(report: &[u8]) -> Self {
        Self::MalformedReport {
            len: report.len(),
            hex: hex::encode(report),
        }
    }
}

impl From<rosc::OscError> for GatewayError {
    fn from(e: rosc::OscError) -> Self {
        Self::Osc(format!("{:?}", e))
    }
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
