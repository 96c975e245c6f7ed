//! Keyboard I/O
//!
//! Commands and input reports go through the HID interface, screen images through the
//! bulk endpoint of the display interface. Without hardware the device runs headless and
//! silently drops everything it is asked to send.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use colored::*;
use hidapi::{HidApi, HidDevice};
use rusb::{Context, DeviceHandle, UsbContext};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::config::DeviceConfig;
use crate::error::Result;

const REPORT_BUFFER_LEN: usize = 3000;
const REPORT_QUEUE_LEN: usize = 256;
const DISPLAY_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Destination of encoded device commands
pub trait CommandSink {
    /// HID command (lighting, configuration, options)
    fn send_command(&mut self, command: &[u8]) -> Result<()>;

    /// Image upload on the display endpoint
    fn send_display(&mut self, command: &[u8]) -> Result<()>;
}

struct Display {
    handle: DeviceHandle<Context>,
    endpoint: u8,
}

struct Reader {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Connection to one keyboard, or to nothing at all
pub struct KontrolDevice {
    hid: Option<HidDevice>,
    display: Option<Display>,
    reader: Option<Reader>,
    report_rx: Option<mpsc::Receiver<Vec<u8>>>,
}

impl KontrolDevice {
    /// Device that discards everything
    pub fn headless() -> Self {
        Self {
            hid: None,
            display: None,
            reader: None,
            report_rx: None,
        }
    }

    /// Open the first matching keyboard, falling back to headless when none is attached
    pub fn open(config: &DeviceConfig) -> Result<Self> {
        let api = HidApi::new()?;
        let found = api
            .device_list()
            .any(|d| d.vendor_id() == config.vendor_id && d.product_id() == config.product_id);
        if !found {
            warn!(
                "No keyboard {:04x}:{:04x} found, running headless",
                config.vendor_id, config.product_id
            );
            return Ok(Self::headless());
        }

        // One handle is moved into the reader thread, the other one writes
        let reader_handle = api.open(config.vendor_id, config.product_id)?;
        let writer_handle = api.open(config.vendor_id, config.product_id)?;

        let display = match open_display(config) {
            Ok(display) => Some(display),
            Err(e) => {
                warn!("Display interface unavailable, screens disabled: {}", e);
                None
            }
        };

        let (tx, rx) = mpsc::channel(REPORT_QUEUE_LEN);
        let reader = spawn_reader(reader_handle, tx, config.read_timeout_ms as i32)?;

        info!(
            "Keyboard {:04x}:{:04x} connected",
            config.vendor_id, config.product_id
        );

        Ok(Self {
            hid: Some(writer_handle),
            display,
            reader: Some(reader),
            report_rx: Some(rx),
        })
    }

    pub fn is_headless(&self) -> bool {
        self.hid.is_none()
    }

    /// Raw input reports from the reader thread (only once)
    pub fn take_report_receiver(&mut self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.report_rx.take()
    }

    /// Stop the reader thread and wait for it to exit
    pub fn disconnect(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.stop.store(true, Ordering::SeqCst);
            if reader.thread.join().is_err() {
                error!("Input reader thread panicked");
            }
            debug!("Input reader stopped");
        }
    }
}

impl Drop for KontrolDevice {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl CommandSink for KontrolDevice {
    fn send_command(&mut self, command: &[u8]) -> Result<()> {
        if let Some(hid) = &self.hid {
            trace!("HID <- {}", hex::encode(command));
            hid.write(command)?;
        }
        Ok(())
    }

    fn send_display(&mut self, command: &[u8]) -> Result<()> {
        if let Some(display) = &self.display {
            display
                .handle
                .write_bulk(display.endpoint, command, DISPLAY_WRITE_TIMEOUT)?;
        }
        Ok(())
    }
}

fn open_display(config: &DeviceConfig) -> Result<Display> {
    let context = Context::new()?;

    for device in context.devices()?.iter() {
        let desc = device.device_descriptor()?;
        if desc.vendor_id() != config.vendor_id || desc.product_id() != config.product_id {
            continue;
        }

        let endpoint = device
            .active_config_descriptor()?
            .interfaces()
            .filter(|i| i.number() == config.display_interface)
            .flat_map(|i| i.descriptors())
            .find_map(|d| d.endpoint_descriptors().next().map(|e| e.address()))
            .ok_or(rusb::Error::NotFound)?;

        let mut handle = device.open()?;
        // Not supported on every platform
        let _ = handle.set_auto_detach_kernel_driver(true);
        handle.claim_interface(config.display_interface)?;

        debug!(
            "Display interface {} endpoint 0x{:02x}",
            config.display_interface, endpoint
        );
        return Ok(Display { handle, endpoint });
    }

    Err(rusb::Error::NoDevice.into())
}

fn spawn_reader(hid: HidDevice, tx: mpsc::Sender<Vec<u8>>, timeout_ms: i32) -> Result<Reader> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let thread = std::thread::Builder::new()
        .name("kontrol-input".into())
        .spawn(move || {
            let mut buf = [0u8; REPORT_BUFFER_LEN];
            while !stop_flag.load(Ordering::SeqCst) {
                match hid.read_timeout(&mut buf, timeout_ms) {
                    Ok(0) => continue,
                    Ok(n) => {
                        if tx.blocking_send(buf[..n].to_vec()).is_err() {
                            debug!("Report receiver dropped, reader exiting");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("HID read failed: {}", e);
                        break;
                    }
                }
            }
        })?;

    Ok(Reader { stop, thread })
}

/// Print every HID device on the system
pub fn list_devices(config: &DeviceConfig) -> Result<()> {
    let api = HidApi::new()?;

    println!("\n{}", "=== HID Devices ===".bold().cyan());
    for info in api.device_list() {
        let line = format!(
            "  {:04x}:{:04x}  if {:>2}  {}",
            info.vendor_id(),
            info.product_id(),
            info.interface_number(),
            info.product_string().unwrap_or("?"),
        );
        if info.vendor_id() == config.vendor_id && info.product_id() == config.product_id {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}
