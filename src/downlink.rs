//! # Downlink Module
//!
//! The ground station's view of the vehicle link: a data source that can be
//! opened, polled and closed, decoding frames from its transport into the
//! telemetry store.
//!
//! Polling never waits. Each call takes whatever bytes the transport has,
//! then runs decode attempts until the buffer needs more data.

use toml::Table;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::Result;
use crate::protocol::decoder::{DecoderStats, FrameDecoder, Step};
use crate::serial::{Connector, SerialConnector, Transport};
use crate::telemetry::TelemetryStore;

/// Lifecycle capability shared by telemetry sources
pub trait DataSource {
    /// Acquire the underlying transport
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the transport cannot be acquired. The call is
    /// not retried.
    fn open(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Ingest whatever has arrived since the last poll
    fn poll(&mut self) -> Result<PollStats>;

    /// Release the transport, discarding undecoded bytes
    fn close(&mut self);
}

/// What a single poll did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub bytes_read: usize,
    pub frames_decoded: usize,
    pub bytes_dropped: usize,
    pub points_appended: usize,
}

/// Iliad telemetry downlink
pub struct Downlink<C = SerialConnector> {
    config: SerialConfig,
    connector: C,
    transport: Option<Box<dyn Transport>>,
    decoder: FrameDecoder,
    store: TelemetryStore,
}

impl<C> std::fmt::Debug for Downlink<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downlink")
            .field("port_name", &self.config.port_name)
            .field("open", &self.transport.is_some())
            .field("stats", &self.decoder.stats())
            .finish_non_exhaustive()
    }
}

impl Downlink {
    /// Downlink over a real serial port
    pub fn new(config: SerialConfig) -> Self {
        Self::with_connector(config, SerialConnector)
    }
}

impl<C: Connector> Downlink<C> {
    /// Downlink over any transport the connector can produce
    pub fn with_connector(config: SerialConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            transport: None,
            decoder: FrameDecoder::new(),
            store: TelemetryStore::new(),
        }
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// True while the decoder is dropping bytes looking for a frame boundary
    pub fn is_recovering(&self) -> bool {
        self.decoder.is_recovering()
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Current serial settings as a table
    pub fn get_config(&self) -> Table {
        self.config.to_table()
    }

    /// Apply serial settings, ignoring invalid entries
    ///
    /// Takes effect the next time the link is opened.
    pub fn set_config(&mut self, table: &Table) {
        self.config.apply(table);
    }
}

impl<C: Connector> DataSource for Downlink<C> {
    fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Ok(());
        }

        self.transport = Some(self.connector.connect(&self.config)?);
        info!("Downlink open on {}", self.config.port_name);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn poll(&mut self) -> Result<PollStats> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(PollStats::default());
        };

        let data = transport.read_available()?;
        let mut stats = PollStats {
            bytes_read: data.len(),
            ..PollStats::default()
        };
        self.decoder.push_bytes(&data);

        loop {
            match self.decoder.step() {
                Step::Frame(frame) => {
                    stats.frames_decoded += 1;
                    stats.points_appended += self.store.ingest(&frame);
                }
                Step::Dropped(_) => stats.bytes_dropped += 1,
                Step::NeedMoreData => break,
            }
        }

        if stats.frames_decoded > 0 || stats.bytes_dropped > 0 {
            debug!(
                "Poll: {} bytes in, {} frames, {} bytes dropped",
                stats.bytes_read, stats.frames_decoded, stats.bytes_dropped
            );
        }

        Ok(stats)
    }

    fn close(&mut self) {
        if self.transport.take().is_some() {
            self.decoder.reset();
            info!("Downlink on {} closed", self.config.port_name);
        }
    }
}
