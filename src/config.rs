//! Configuration for the gateway
//!
//! Loaded from YAML. Every field has a default, so an empty or missing file is valid.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::osc::flags;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub osc: OscConfig,
    pub device: DeviceConfig,
    pub timing: TimingConfig,
    pub debug: DebugConfig,
    pub logging: LoggingConfig,
}

/// Ardour OSC surface settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OscConfig {
    pub listen_port: u16,
    pub remote_host: String,
    pub remote_port: u16,
    pub strip_flags: i32,
    pub feedback_flags: i32,
    pub gain_mode: i32,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            listen_port: 9100,
            remote_host: "127.0.0.1".to_string(),
            remote_port: 3819,
            strip_flags: flags::strip::DEFAULT,
            feedback_flags: flags::feedback::DEFAULT,
            gain_mode: flags::gain_mode::FADER_AND_GAIN,
        }
    }
}

impl OscConfig {
    pub fn remote_addr(&self) -> Result<SocketAddr> {
        (self.remote_host.as_str(), self.remote_port)
            .to_socket_addrs()
            .with_context(|| format!("Invalid OSC remote {}:{}", self.remote_host, self.remote_port))?
            .next()
            .with_context(|| format!("OSC remote {} did not resolve", self.remote_host))
    }
}

/// USB identity of the keyboard
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub display_interface: u8,
    pub read_timeout_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x17cc,
            product_id: 0x1620,
            display_interface: 3,
            read_timeout_ms: 100,
        }
    }
}

/// Debounce and polling intervals, in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub redraw_min_ms: u64,
    pub redraw_max_ms: u64,
    pub config_min_ms: u64,
    pub config_max_ms: u64,
    pub handshake_poll_ms: u64,
    pub handshake_settle_ms: u64,
    pub animation_tick_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            redraw_min_ms: 10,
            redraw_max_ms: 20,
            config_min_ms: 10,
            config_max_ms: 20,
            handshake_poll_ms: 100,
            handshake_settle_ms: 100,
            animation_tick_ms: 20,
        }
    }
}

impl TimingConfig {
    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Write every uploaded screen as `screen{n}.png` here
    pub frame_dump_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Daily rolling log files go here when set
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a YAML file; a missing file yields the defaults
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.timing;
        if t.redraw_min_ms == 0 || t.config_min_ms == 0 {
            anyhow::bail!("Debounce quiet periods must be non-zero");
        }
        if t.redraw_max_ms < t.redraw_min_ms || t.config_max_ms < t.config_min_ms {
            anyhow::bail!("Debounce ceilings cannot be shorter than their quiet periods");
        }
        if t.handshake_poll_ms == 0 || t.animation_tick_ms == 0 {
            anyhow::bail!("Poll intervals must be non-zero");
        }
        if self.osc.remote_host.is_empty() {
            anyhow::bail!("OSC remote_host cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(config.osc.listen_port, 9100);
        assert_eq!(config.device.product_id, 0x1620);
        assert_eq!(config.timing.redraw_max_ms, 20);
        assert!(config.debug.frame_dump_dir.is_none());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "osc:\n  remote_port: 4000\ntiming:\n  animation_tick_ms: 40").unwrap();

        let config = AppConfig::load(file.path()).await.unwrap();
        assert_eq!(config.osc.remote_port, 4000);
        assert_eq!(config.osc.remote_host, "127.0.0.1");
        assert_eq!(config.osc.gain_mode, 2);
        assert_eq!(config.timing.animation_tick_ms, 40);
        assert_eq!(config.timing.config_min_ms, 10);
    }

    #[tokio::test]
    async fn test_invalid_timing_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timing:\n  redraw_min_ms: 50\n  redraw_max_ms: 10").unwrap();
        assert!(AppConfig::load(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "osc: [unclosed").unwrap();
        assert!(AppConfig::load(file.path()).await.is_err());
    }

    #[test]
    fn test_remote_addr() {
        let addr = OscConfig::default().remote_addr().unwrap();
        assert_eq!(addr.port(), 3819);
    }
}
