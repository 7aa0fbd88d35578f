//! # Iliad Downlink
//!
//! Ground-station receiver for the Iliad vehicle telemetry link.
//!
//! Reads the serial downlink, decodes and checksum-verifies frames, and keeps
//! every telemetry channel's time series in memory.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use iliad_downlink::config::Config;
use iliad_downlink::downlink::{DataSource, Downlink};
use iliad_downlink::logging;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of decoded frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 100;

/// Prefix for rolling log files
const LOG_FILE_PREFIX: &str = "iliad-downlink.log";

/// Main entry point for the Iliad ground station
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging
///    - Open the serial downlink
///
/// 2. **Main Loop**
///    - Poll the downlink every `poll.interval_ms`
///    - Log decode progress every 100 frames
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Close the link, discarding any partial frame
///    - Log session totals
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be loaded
/// - The serial port cannot be opened
/// - Reading from the serial port fails
#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_source) = load_config()?;
    let _log_guard = logging::init(&config.logging, LOG_FILE_PREFIX);

    info!("Iliad Downlink v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config_source);

    let mut downlink = Downlink::new(config.serial.clone());
    downlink.open()?;

    let mut poll_interval = interval(Duration::from_millis(config.poll.interval_ms));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Polling every {}ms", config.poll.interval_ms);
    info!("Press Ctrl+C to exit");

    let mut last_log_frames: u64 = 0;

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                if let Err(e) = downlink.poll() {
                    error!("Downlink read failed: {}", e);
                    downlink.close();
                    return Err(e.into());
                }

                let stats = downlink.decoder_stats();
                if stats.frames_decoded - last_log_frames >= LOG_INTERVAL_FRAMES {
                    info!(
                        "Decoded {} frames ({} bytes dropped, {} resyncs)",
                        stats.frames_decoded, stats.bytes_dropped, stats.resyncs
                    );
                    last_log_frames = stats.frames_decoded;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    downlink.close();

    let stats = downlink.decoder_stats();
    info!(
        "Session totals: {} frames, {} points, {} checksum failures, {} bytes dropped",
        stats.frames_decoded,
        downlink.store().total_points(),
        stats.checksum_failures,
        stats.bytes_dropped
    );

    Ok(())
}

/// Load the configuration named on the command line
///
/// Falls back to built-in defaults only when no path was given and the
/// default file does not exist.
fn load_config() -> Result<(Config, String)> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = Config::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path))?;
            Ok((config, path))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            let config = Config::load(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH))?;
            Ok((config, DEFAULT_CONFIG_PATH.to_string()))
        }
        None => Ok((Config::default(), "built-in defaults".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_FRAMES, 100);
    }

    #[test]
    fn test_default_config_file_parses() {
        let contents = std::fs::read_to_string(
            Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH),
        )
        .unwrap();
        let config = Config::parse(&contents).unwrap();
        assert_eq!(config, Config::default());
    }
}
