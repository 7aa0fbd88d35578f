//! # Resynchronizer
//!
//! Recovers frame alignment after corruption by discarding exactly one byte
//! per rejected decode attempt.
//!
//! There is no retry bound. A buffer that never contains a valid frame keeps
//! losing one byte per attempt until it is empty; that is accepted behavior
//! for a noisy link, not a fault to be capped.

use tracing::{debug, info};

use super::buffer::StreamBuffer;

/// Why a decode attempt was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Footer did not match the recomputed CRC
    ChecksumMismatch { received: u32, computed: u32 },

    /// Type mask has bits with no catalog entry, so the frame cannot be sized
    UnknownPacketTypes { bits: u16 },
}

/// Single-byte drop policy with recovery bookkeeping
#[derive(Debug, Default, Clone)]
pub struct Resynchronizer {
    /// Bytes dropped since the last accepted frame
    run: usize,
    total_dropped: u64,
    resyncs: u64,
}

impl Resynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop one byte from the front of the buffer after a rejected attempt
    ///
    /// # Returns
    ///
    /// * `Option<u8>` - The dropped byte, or `None` if the buffer was empty
    pub fn reject(&mut self, buffer: &mut StreamBuffer, rejection: Rejection) -> Option<u8> {
        let dropped = buffer.drop_front()?;

        if self.run == 0 {
            debug!("Lost frame sync: {:?}", rejection);
        }
        self.run += 1;
        self.total_dropped += 1;

        Some(dropped)
    }

    /// Record that a frame was accepted at the current buffer front
    pub fn accept(&mut self) {
        if self.run > 0 {
            info!("Resynchronized after dropping {} bytes", self.run);
            self.resyncs += 1;
            self.run = 0;
        }
    }

    /// True while bytes have been dropped since the last accepted frame
    pub fn is_recovering(&self) -> bool {
        self.run > 0
    }

    /// Bytes dropped in the current recovery run
    pub fn current_run(&self) -> usize {
        self.run
    }

    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    /// Number of recovery runs that ended with a valid frame
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Forget the current recovery run (session end)
    pub fn reset_run(&mut self) {
        self.run = 0;
    }
}
