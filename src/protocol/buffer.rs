//! # Byte Stream Buffer
//!
//! Accumulates inbound transport bytes for the decoder.
//!
//! Parsing never mutates the buffer. A decode attempt reads through a
//! [`ScratchCursor`] over a borrowed view; the buffer only shrinks from the
//! front when the attempt commits, either by consuming a whole frame or by
//! dropping a single byte to resynchronize.

use bytes::{Buf, BytesMut};

/// Growable inbound byte buffer, owned by the decoder
#[derive(Debug, Default)]
pub struct StreamBuffer {
    bytes: BytesMut,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly arrived bytes to the tail
    pub fn extend(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Buffered bytes, front first
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Start a non-committing parse at the front of the buffer
    pub fn cursor(&self) -> ScratchCursor<'_> {
        ScratchCursor::new(&self.bytes)
    }

    /// Commit a successful parse by dropping the consumed prefix
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the buffered length.
    pub fn consume(&mut self, len: usize) {
        self.bytes.advance(len);
    }

    /// Drop exactly one byte from the front, returning it
    pub fn drop_front(&mut self) -> Option<u8> {
        if self.bytes.is_empty() {
            None
        } else {
            Some(self.bytes.get_u8())
        }
    }

    /// Discard everything (session end)
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Read-only cursor over buffered bytes
///
/// Every read returns `None` when fewer bytes remain than the value needs,
/// leaving the cursor where it was.
#[derive(Debug, Clone)]
pub struct ScratchCursor<'a> {
    data: &'a [u8],
    start_len: usize,
}

impl<'a> ScratchCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            start_len: data.len(),
        }
    }

    /// Number of bytes read so far
    pub fn consumed(&self) -> usize {
        self.start_len - self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        (self.data.remaining() >= 1).then(|| self.data.get_u8())
    }

    pub fn read_i16(&mut self) -> Option<i16> {
        (self.data.remaining() >= 2).then(|| self.data.get_i16())
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        (self.data.remaining() >= 4).then(|| self.data.get_u32())
    }

    pub fn read_f32(&mut self) -> Option<f32> {
        (self.data.remaining() >= 4).then(|| self.data.get_f32())
    }

    /// Take the next `len` bytes as a slice
    pub fn read_slice(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.data.len() < len {
            return None;
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Some(head)
    }
}
