//! Kontrol GW - Rust implementation
//!
//! Drives the screens, lights and controls of a Komplete Kontrol keyboard as an Ardour
//! mixer surface over OSC.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use rosc::OscMessage;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kontrol_gw::config::{AppConfig, TimingConfig};
use kontrol_gw::error::GatewayError;
use kontrol_gw::kontrol::device::list_devices;
use kontrol_gw::kontrol::KontrolDevice;
use kontrol_gw::osc::{MixerSync, UdpTransport};
use kontrol_gw::render::{FlatRenderer, PngDumper};
use kontrol_gw::router::{Refresh, Router};
use kontrol_gw::views::GlobalView;

/// Kontrol GW - Komplete Kontrol keyboard as an Ardour control surface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List HID devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Do not touch the hardware even if a keyboard is attached
    #[arg(long)]
    headless: bool,

    /// Open the mixer session at startup
    #[arg(long)]
    connect: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::load(&args.config).await?;

    let _log_guard = init_logging(&args.log_level, config.logging.dir.as_deref())?;

    info!("Starting Kontrol GW v{}...", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    if args.list_devices {
        list_devices(&config.device)?;
        return Ok(());
    }

    let mut device = if args.headless {
        info!("Headless mode, hardware disabled");
        KontrolDevice::headless()
    } else {
        KontrolDevice::open(&config.device).context("Failed to open keyboard")?
    };
    let reports = device.take_report_receiver();

    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
    let mut router = Router::new(
        Box::new(GlobalView::new()),
        &config.timing,
        refresh_tx,
        Box::new(device),
        Box::new(FlatRenderer),
    );
    info!("Router initialized");

    if let Some(dir) = &config.debug.frame_dump_dir {
        let dumper = PngDumper::new(dir)
            .with_context(|| format!("Failed to prepare frame dump dir {}", dir.display()))?;
        router.add_frame_sink(Box::new(dumper));
        info!("Dumping screen frames to {}", dir.display());
    }

    if args.connect {
        router.request_mixer();
    }

    let result = run_app(router, reports, refresh_rx, &config, shutdown_signal()).await;
    if let Err(e) = &result {
        error!("Stopping: {:#}", e);
    }

    info!("Kontrol GW shutdown complete");
    result
}

async fn run_app(
    mut router: Router,
    mut reports: Option<mpsc::Receiver<Vec<u8>>>,
    mut refresh_rx: mpsc::UnboundedReceiver<Refresh>,
    config: &AppConfig,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    info!("Starting main application loop...");

    let mut osc_rx: Option<mpsc::Receiver<OscMessage>> = None;
    let mut handshake = interval(TimingConfig::ms(config.timing.handshake_poll_ms));
    let mut animation = interval(TimingConfig::ms(config.timing.animation_tick_ms));
    animation.set_missed_tick_behavior(MissedTickBehavior::Skip);

    router.start();
    tokio::pin!(shutdown);

    let result: Result<()> = async {
        loop {
            if router.take_mixer_request() {
                match open_mixer(config).await {
                    Ok((sync, rx)) => {
                        router.attach_mixer(sync);
                        osc_rx = Some(rx);
                    }
                    Err(e) => warn!("Mixer session unavailable: {:#}", e),
                }
            }

            tokio::select! {
                // Keyboard input; the reader closes the channel when the device fails
                report = next_message(&mut reports), if reports.is_some() => match report {
                    Some(report) => router.handle_report(&report),
                    None => return Err(GatewayError::DeviceLost.into()),
                },

                // Debounced redraws and configuration uploads
                Some(refresh) = refresh_rx.recv() => match refresh {
                    Refresh::Redraw => router.draw().context("Screen upload failed")?,
                    Refresh::DeviceConfig => router
                        .push_device_config()
                        .context("Device configuration upload failed")?,
                },

                // Mixer feedback
                msg = next_message(&mut osc_rx), if osc_rx.is_some() => match msg {
                    Some(msg) => router.handle_osc(&msg)?,
                    None => return Err(GatewayError::ConnectionLost.into()),
                },

                now = handshake.tick() => {
                    router.poll_handshake(now)?;
                }

                now = animation.tick() => {
                    router.tick(now);
                }

                // Handle shutdown signal
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping event loop");
                    return Ok(());
                }
            }
        }
    }
    .await;

    // The reader may be parked on a full queue; close it before joining
    info!("Shutting down...");
    drop(reports);
    drop(router);
    result
}

/// Bind the OSC socket and announce the surface
async fn open_mixer(config: &AppConfig) -> Result<(MixerSync, mpsc::Receiver<OscMessage>)> {
    let remote = config.osc.remote_addr()?;
    let (transport, rx) = UdpTransport::bind(config.osc.listen_port, remote)
        .await
        .with_context(|| format!("Failed to bind OSC port {}", config.osc.listen_port))?;
    let reply_port = transport.local_port()?;
    info!("OSC session {} <-> {}", reply_port, remote);

    let sync = MixerSync::connect(
        Box::new(transport),
        &config.osc,
        reply_port,
        TimingConfig::ms(config.timing.handshake_settle_ms),
    )?;
    Ok((sync, rx))
}

/// Next message of an optional channel; pending forever without one
async fn next_message<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str, dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (file_layer, guard) = match dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "kontrol-gw.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless_router() -> (Router, mpsc::UnboundedReceiver<Refresh>) {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let router = Router::new(
            Box::new(GlobalView::new()),
            &AppConfig::default().timing,
            refresh_tx,
            Box::new(KontrolDevice::headless()),
            Box::new(FlatRenderer),
        );
        (router, refresh_rx)
    }

    #[tokio::test]
    async fn test_closed_report_channel_stops_loop() {
        let (router, refresh_rx) = headless_router();
        let (tx, rx) = mpsc::channel::<Vec<u8>>(4);
        drop(tx);

        let result = run_app(
            router,
            Some(rx),
            refresh_rx,
            &AppConfig::default(),
            std::future::pending::<()>(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GatewayError>(),
            Some(GatewayError::DeviceLost)
        ));
    }

    #[tokio::test]
    async fn test_headless_loop_runs_until_shutdown() {
        let (router, refresh_rx) = headless_router();
        let shutdown = tokio::time::sleep(std::time::Duration::from_millis(50));

        let result = run_app(router, None, refresh_rx, &AppConfig::default(), shutdown).await;
        assert!(result.is_ok());
    }
}
