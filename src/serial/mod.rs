//! # Serial Communication Module
//!
//! Handles the serial link between the vehicle radio and the ground station.
//!
//! This module handles:
//! - Opening a serial port with the configured framing settings
//! - Non-blocking reads of whatever bytes have arrived (receiving side)
//! - Async frame transmission (simulator side)

pub mod port_trait;

pub use port_trait::{Connector, LoopbackTransport, Transport};

use std::io::{self, Read};
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilder, SerialPortBuilderExt};
use tracing::{debug, info};

use crate::config::{Parity, SerialConfig, StopBits};
use crate::error::{DownlinkError, Result};

/// Build a port builder from the configuration
///
/// # Errors
///
/// Returns `Connection` for settings the serial driver cannot express
/// (1.5 stop bits, mark/space parity, unsupported data bits)
fn port_builder(config: &SerialConfig) -> Result<SerialPortBuilder> {
    let unsupported = |what: String| {
        DownlinkError::Connection(format!(
            "Serial port \"{}\" couldn't be opened: {} not supported by the serial driver",
            config.port_name, what
        ))
    };

    let data_bits = match config.byte_size {
        5 => tokio_serial::DataBits::Five,
        6 => tokio_serial::DataBits::Six,
        7 => tokio_serial::DataBits::Seven,
        8 => tokio_serial::DataBits::Eight,
        other => return Err(unsupported(format!("{} data bits", other))),
    };

    let parity = match config.parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Even => tokio_serial::Parity::Even,
        Parity::Odd => tokio_serial::Parity::Odd,
        other => return Err(unsupported(format!("{} parity", other))),
    };

    let stop_bits = match config.stop_bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
        other => return Err(unsupported(format!("{} stop bits", other))),
    };

    Ok(tokio_serial::new(config.port_name.as_str(), config.baud_rate)
        .data_bits(data_bits)
        .parity(parity)
        .stop_bits(stop_bits)
        .flow_control(tokio_serial::FlowControl::None)
        .timeout(Duration::from_millis(config.timeout_ms)))
}

fn open_error(config: &SerialConfig, e: tokio_serial::Error) -> DownlinkError {
    DownlinkError::Connection(format!(
        "Serial port \"{}\" couldn't be opened: {}",
        config.port_name, e
    ))
}

/// Receiving side of a serial link
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Open a serial port for reading
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the port cannot be opened with these settings
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Trying to open serial port: {}", config.port_name);

        let port = port_builder(config)?
            .open()
            .map_err(|e| open_error(config, e))?;

        info!(
            "Opened {} at {} baud ({} data bits, {} parity, {} stop bits)",
            config.port_name, config.baud_rate, config.byte_size, config.parity, config.stop_bits
        );

        Ok(Self {
            port,
            port_name: config.port_name.clone(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Transport for SerialTransport {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 {
            return Ok(Vec::new());
        }

        let mut data = vec![0u8; pending];
        let read = self.port.read(&mut data)?;
        data.truncate(read);
        Ok(data)
    }
}

/// Connector opening real serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn connect(&self, config: &SerialConfig) -> Result<Box<dyn Transport>> {
        Ok(Box::new(SerialTransport::open(config)?))
    }
}

/// Sending side of a serial link, used to inject frames
pub struct FrameSender<W = tokio_serial::SerialStream> {
    writer: W,
    port_name: String,
    frames_sent: u64,
}

impl<W> std::fmt::Debug for FrameSender<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSender")
            .field("port_name", &self.port_name)
            .field("frames_sent", &self.frames_sent)
            .finish_non_exhaustive()
    }
}

impl FrameSender {
    /// Open a serial port for async writing
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the port cannot be opened with these settings
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = port_builder(config)?
            .open_native_async()
            .map_err(|e| open_error(config, e))?;

        info!("Opened {} for sending at {} baud", config.port_name, config.baud_rate);
        Ok(Self::new(port, config.port_name.clone()))
    }
}

impl<W: AsyncWrite + Unpin> FrameSender<W> {
    pub fn new(writer: W, port_name: impl Into<String>) -> Self {
        Self {
            writer,
            port_name: port_name.into(),
            frames_sent: 0,
        }
    }

    /// Send one encoded frame
    ///
    /// # Arguments
    ///
    /// * `frame` - Complete wire frame (mask, timestamp, payload, checksum)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iliad_downlink::config::SerialConfig;
    /// use iliad_downlink::protocol::catalog::PacketType;
    /// use iliad_downlink::protocol::encoder::FrameBuilder;
    /// use iliad_downlink::serial::FrameSender;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let mut sender = FrameSender::open(&SerialConfig::default())?;
    ///
    ///     let frame = FrameBuilder::new(0.0)
    ///         .block(PacketType::ArmStatus, [true, true, true])
    ///         .build()?;
    ///     sender.send_frame(&frame).await?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.writer.write_all(frame).await?;
        self.writer.flush().await?;

        self.frames_sent += 1;
        debug!("Sent frame ({} bytes) to {}", frame.len(), self.port_name);
        Ok(())
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(f: impl FnOnce(&mut SerialConfig)) -> SerialConfig {
        let mut config = SerialConfig::default();
        f(&mut config);
        config
    }

    #[test]
    fn test_port_builder_accepts_defaults() {
        assert!(port_builder(&SerialConfig::default()).is_ok());
    }

    #[test]
    fn test_port_builder_rejects_one_and_half_stop_bits() {
        let config = config_with(|c| c.stop_bits = StopBits::OnePointFive);
        match port_builder(&config) {
            Err(DownlinkError::Connection(msg)) => assert!(msg.contains("1.5 stop bits")),
            other => panic!("Expected Connection error, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_port_builder_rejects_mark_parity() {
        let config = config_with(|c| c.parity = Parity::Mark);
        assert!(matches!(port_builder(&config), Err(DownlinkError::Connection(_))));
    }

    #[test]
    fn test_open_with_invalid_path_returns_error() {
        let config = config_with(|c| c.port_name = "/dev/nonexistent_serial_device_12345".into());
        let err = SerialTransport::open(&config).unwrap_err();

        match err {
            DownlinkError::Connection(msg) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("couldn't be opened"));
            }
            _ => panic!("Expected Connection error, got: {:?}", err),
        }
    }

    #[test]
    fn test_serial_connector_propagates_error() {
        let config = config_with(|c| c.port_name = "/dev/nonexistent_serial_device_12345".into());
        assert!(matches!(
            SerialConnector.connect(&config),
            Err(DownlinkError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_frame_sender_writes_frames() {
        let mut sender = FrameSender::new(Vec::new(), "memory");
        sender.send_frame(&[1, 2, 3]).await.unwrap();
        sender.send_frame(&[4]).await.unwrap();

        assert_eq!(sender.frames_sent(), 2);
        assert_eq!(sender.port_name(), "memory");
        assert_eq!(sender.into_inner(), vec![1, 2, 3, 4]);
    }

    // Integration test - only runs if a serial device is present
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_send_frame_with_real_hardware() {
        if let Ok(mut sender) = FrameSender::open(&SerialConfig::default()) {
            let result = sender.send_frame(&[0u8; 11]).await;
            assert!(result.is_ok(), "Failed to send frame: {:?}", result);
        } else {
            println!("No serial hardware detected (skipping send test)");
        }
    }
}
