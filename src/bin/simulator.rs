//! # Iliad Simulator
//!
//! Writes synthetic Iliad telemetry frames to a serial port, standing in for
//! the vehicle radio during bench testing. Pair it with the ground station
//! over a virtual null-modem (e.g. `socat`).

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use iliad_downlink::config::{Config, SerialConfig};
use iliad_downlink::logging;
use iliad_downlink::serial::FrameSender;
use iliad_downlink::simulation::SyntheticTelemetry;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 100;

/// Prefix for rolling log files
const LOG_FILE_PREFIX: &str = "iliad-simulator.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH))?,
        None => Config::default(),
    };
    let _log_guard = logging::init(&config.logging, LOG_FILE_PREFIX);

    info!("Iliad Simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    // Same line settings as the receiver, on the other end of the pair
    let port_config = SerialConfig {
        port_name: config.simulator.port_name.clone(),
        ..config.serial.clone()
    };
    let mut sender = FrameSender::open(&port_config)?;

    let rate_hz = config.simulator.rate_hz;
    let mut telemetry = SyntheticTelemetry::new(rate_hz);
    let mut frame_interval = interval(Duration::from_micros(1_000_000 / u64::from(rate_hz)));
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Sending frames to {} at {}Hz", sender.port_name(), rate_hz);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                let frame = telemetry.next_frame()?;

                if let Err(e) = sender.send_frame(&frame).await {
                    debug!("Failed to send frame: {}", e);
                    continue;
                }

                if sender.frames_sent() % LOG_INTERVAL_FRAMES == 0 {
                    info!("Sent {} frames (t={:.1}s)", sender.frames_sent(), telemetry.timestamp());
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames sent: {}", sender.frames_sent());
                break;
            }
        }
    }

    Ok(())
}
