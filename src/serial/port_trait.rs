//! Trait abstraction for the downlink transport to enable testing

use bytes::BytesMut;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::SerialConfig;
use crate::error::Result;

/// Byte source feeding the decoder
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send {
    /// Read everything the transport has buffered, without waiting
    ///
    /// Returns an empty vector when nothing has arrived.
    fn read_available(&mut self) -> io::Result<Vec<u8>>;
}

/// Acquires a transport for a serial configuration
#[cfg_attr(test, mockall::automock)]
pub trait Connector: Send {
    /// Open the transport described by `config`
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the transport cannot be acquired
    fn connect(&self, config: &SerialConfig) -> Result<Box<dyn Transport>>;
}

/// In-memory transport
///
/// Clones share the same inbound queue: hand one clone to the downlink and
/// write frames through another.
#[derive(Debug, Clone, Default)]
pub struct LoopbackTransport {
    inbound: Arc<Mutex<BytesMut>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the reading side
    pub fn write(&self, data: &[u8]) {
        self.queue().extend_from_slice(data);
    }

    /// Bytes queued but not yet read
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    fn queue(&self) -> MutexGuard<'_, BytesMut> {
        // A panicking writer cannot leave the queue half-updated
        self.inbound.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for LoopbackTransport {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.queue().split().to_vec())
    }
}

impl Connector for LoopbackTransport {
    fn connect(&self, _config: &SerialConfig) -> Result<Box<dyn Transport>> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_read_drains_queue() {
        let writer = LoopbackTransport::new();
        let mut reader = writer.clone();

        writer.write(&[1, 2]);
        writer.write(&[3]);
        assert_eq!(writer.pending(), 3);

        assert_eq!(reader.read_available().unwrap(), vec![1, 2, 3]);
        assert_eq!(reader.read_available().unwrap(), Vec::<u8>::new());
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn test_loopback_connector_shares_queue() {
        let loopback = LoopbackTransport::new();
        let mut transport = loopback.connect(&SerialConfig::default()).unwrap();

        loopback.write(&[0xAB]);
        assert_eq!(transport.read_available().unwrap(), vec![0xAB]);
    }
}
