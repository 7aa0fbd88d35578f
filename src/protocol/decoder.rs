//! # Iliad Frame Decoder
//!
//! Decodes downlink frames from the front of the stream buffer.
//!
//! A decode attempt has three outcomes:
//! - **Complete**: the frame parsed and its checksum verified; the frame's
//!   bytes are consumed from the buffer.
//! - **Need more data**: some field ran past the end of the buffer; nothing is
//!   consumed and the attempt is retried once more bytes arrive.
//! - **Rejected**: checksum mismatch or an unsizable type mask; exactly one
//!   byte is dropped and the next attempt starts at the new front.
//!
//! Decoded values are held in the returned [`DecodedFrame`] and only reach the
//! time series once the checksum has verified, so a corrupted frame never
//! pollutes channel history.

use bytes::Bytes;
use tracing::{debug, trace};

use super::buffer::{ScratchCursor, StreamBuffer};
use super::catalog::{FieldKind, PacketType, TypeMask};
use super::crc::{crc16_ccitt, footer_value};
use super::frame::{DecodedFrame, RawFrame, Reading, Value, MIN_BUFFERED_LEN};
use super::resync::{Rejection, Resynchronizer};

/// Outcome of a single decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeStatus {
    /// A verified frame at the front of the data
    Complete(DecodedFrame),

    /// The data ends before the frame does
    NeedMoreData,

    /// The data at the front is not a valid frame
    Rejected(Rejection),
}

/// Attempt to decode one frame from the front of `data`
///
/// Pure: `data` is only read. The caller commits the outcome
/// (see [`FrameDecoder`]).
///
/// # Arguments
///
/// * `data` - Buffered bytes, front first
///
/// # Returns
///
/// * `DecodeStatus` - Complete frame, need more data, or rejection
pub fn decode_frame(data: &[u8]) -> DecodeStatus {
    if data.len() <= MIN_BUFFERED_LEN {
        return DecodeStatus::NeedMoreData;
    }

    match parse_frame(data) {
        None => DecodeStatus::NeedMoreData,
        Some(Ok(frame)) => DecodeStatus::Complete(frame),
        Some(Err(rejection)) => DecodeStatus::Rejected(rejection),
    }
}

/// Parse through a scratch cursor; `None` means the data ran out
fn parse_frame(data: &[u8]) -> Option<Result<DecodedFrame, Rejection>> {
    let mut cursor = ScratchCursor::new(data);

    let type_mask = TypeMask::from_wire(cursor.read_i16()?);
    let timestamp = cursor.read_f32()?;

    if type_mask.unknown_bits() != 0 {
        return Some(Err(Rejection::UnknownPacketTypes {
            bits: type_mask.unknown_bits(),
        }));
    }

    let payload_start = cursor.consumed();
    let mut readings = Vec::with_capacity(type_mask.field_count());
    for packet_type in type_mask.packet_types() {
        let block = cursor.read_slice(packet_type.payload_size())?;
        unpack_block(packet_type, block, &mut readings)?;
    }
    let payload_end = cursor.consumed();

    let received = cursor.read_u32()?;
    let computed = footer_value(crc16_ccitt(&data[..payload_end]));
    if received != computed {
        return Some(Err(Rejection::ChecksumMismatch { received, computed }));
    }

    Some(Ok(DecodedFrame {
        raw: RawFrame {
            type_mask,
            timestamp,
            payload: Bytes::copy_from_slice(&data[payload_start..payload_end]),
            checksum: received,
        },
        readings,
    }))
}

/// Unpack one payload block into per-channel readings
fn unpack_block(packet_type: PacketType, block: &[u8], readings: &mut Vec<Reading>) -> Option<()> {
    let mut cursor = ScratchCursor::new(block);

    for channel in packet_type.channels() {
        let value = match channel.kind() {
            FieldKind::Bool => Value::Bool(cursor.read_u8()? != 0),
            FieldKind::F32 => Value::Float(cursor.read_f32()?),
            FieldKind::I16 => Value::Int(cursor.read_i16()?),
        };
        readings.push(Reading { channel, value });
    }

    Some(())
}

/// Result of one committed decode step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A frame was decoded and its bytes consumed
    Frame(DecodedFrame),

    /// Nothing changed; wait for more bytes
    NeedMoreData,

    /// One byte was dropped to resynchronize
    Dropped(Rejection),
}

/// Decoder counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub frames_decoded: u64,
    pub checksum_failures: u64,
    pub unknown_mask_rejections: u64,
    pub bytes_dropped: u64,
    pub resyncs: u64,
}

/// Stateful decoder owning the stream buffer
///
/// The decoder is the only writer of its buffer. Attempts run one at a time
/// through `&mut self`, so a scratch parse can never race a buffer mutation.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: StreamBuffer,
    resync: Resynchronizer,
    frames_decoded: u64,
    checksum_failures: u64,
    unknown_mask_rejections: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly received bytes
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Bytes buffered but not yet decoded
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Run one decode attempt and commit its outcome
    pub fn step(&mut self) -> Step {
        match decode_frame(self.buffer.as_slice()) {
            DecodeStatus::Complete(frame) => {
                self.buffer.consume(frame.raw.wire_len());
                self.resync.accept();
                self.frames_decoded += 1;
                trace!(
                    "Decoded frame mask=0x{:04X} t={} ({} bytes)",
                    frame.raw.type_mask.bits(),
                    frame.raw.timestamp,
                    frame.raw.wire_len()
                );
                Step::Frame(frame)
            }
            DecodeStatus::NeedMoreData => Step::NeedMoreData,
            DecodeStatus::Rejected(rejection) => {
                match rejection {
                    Rejection::ChecksumMismatch { .. } => self.checksum_failures += 1,
                    Rejection::UnknownPacketTypes { .. } => self.unknown_mask_rejections += 1,
                }
                self.resync.reject(&mut self.buffer, rejection);
                Step::Dropped(rejection)
            }
        }
    }

    /// Decode the next frame, dropping bytes as needed to find one
    ///
    /// # Returns
    ///
    /// * `Option<DecodedFrame>` - The next verified frame, or `None` once the
    ///   buffer needs more data
    pub fn next_frame(&mut self) -> Option<DecodedFrame> {
        loop {
            match self.step() {
                Step::Frame(frame) => return Some(frame),
                Step::NeedMoreData => return None,
                Step::Dropped(_) => continue,
            }
        }
    }

    /// True while bytes have been dropped since the last good frame
    pub fn is_recovering(&self) -> bool {
        self.resync.is_recovering()
    }

    pub fn stats(&self) -> DecoderStats {
        DecoderStats {
            frames_decoded: self.frames_decoded,
            checksum_failures: self.checksum_failures,
            unknown_mask_rejections: self.unknown_mask_rejections,
            bytes_dropped: self.resync.total_dropped(),
            resyncs: self.resync.resyncs(),
        }
    }

    /// Discard buffered bytes (session end); counters are kept
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            debug!("Discarding {} undecoded bytes", self.buffer.len());
        }
        self.buffer.clear();
        self.resync.reset_run();
    }
}
