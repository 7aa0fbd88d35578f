//! # Frame Types
//!
//! Wire layout constants and the structures produced by the decoder.
//!
//! ```text
//! +-----------+-----------+---------------------+-----------+
//! | type mask | timestamp | payload blocks ...  | checksum  |
//! |  i16 BE   |  f32 BE   | ascending flag order|  u32 BE   |
//! +-----------+-----------+---------------------+-----------+
//! ```

use bytes::Bytes;

use super::catalog::{Channel, FieldKind, TypeMask};

/// Type mask size in bytes
pub const TYPE_MASK_LEN: usize = 2;

/// Timestamp size in bytes
pub const TIMESTAMP_LEN: usize = 4;

/// Header size (type mask + timestamp)
pub const HEADER_LEN: usize = TYPE_MASK_LEN + TIMESTAMP_LEN;

/// Checksum footer size in bytes
pub const CHECKSUM_LEN: usize = 4;

/// A decode attempt is only started once the buffer holds more than this
/// many bytes (header + footer)
pub const MIN_BUFFERED_LEN: usize = HEADER_LEN + CHECKSUM_LEN;

/// A single decoded field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Float(f32),
    Int(i16),
}

impl Value {
    /// Scalar kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Bool(_) => FieldKind::Bool,
            Value::Float(_) => FieldKind::F32,
            Value::Int(_) => FieldKind::I16,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v)
    }
}

/// One channel's value from a decoded frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub channel: Channel,
    pub value: Value,
}

/// A frame exactly as it was read off the wire
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Type mask selecting the payload blocks
    pub type_mask: TypeMask,

    /// Sender timestamp
    pub timestamp: f32,

    /// Concatenated payload blocks, ascending flag order
    pub payload: Bytes,

    /// Checksum footer as received
    pub checksum: u32,
}

impl RawFrame {
    /// Total number of bytes the frame occupied on the wire
    pub fn wire_len(&self) -> usize {
        HEADER_LEN + self.payload.len() + CHECKSUM_LEN
    }
}

/// A checksum-verified frame with its payload unpacked per channel
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub raw: RawFrame,

    /// One reading per field, ascending flag order then field order
    pub readings: Vec<Reading>,
}

impl DecodedFrame {
    pub fn timestamp(&self) -> f32 {
        self.raw.timestamp
    }

    /// Value decoded for a channel, if its packet type was present
    pub fn value(&self, channel: Channel) -> Option<Value> {
        self.readings
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| r.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::catalog::PacketType;

    #[test]
    fn test_frame_constants() {
        assert_eq!(HEADER_LEN, 6);
        assert_eq!(CHECKSUM_LEN, 4);
        assert_eq!(MIN_BUFFERED_LEN, 10);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(true).as_f32(), None);
        assert_eq!(Value::from(1.5f32).as_f32(), Some(1.5));
        assert_eq!(Value::from(7i16).as_i16(), Some(7));
        assert_eq!(Value::from(7i16).kind(), FieldKind::I16);
    }

    #[test]
    fn test_raw_frame_wire_len() {
        let frame = RawFrame {
            type_mask: TypeMask::from_bits(PacketType::ArmStatus.flag()),
            timestamp: 0.0,
            payload: Bytes::from_static(&[1, 1, 1]),
            checksum: 0,
        };
        assert_eq!(frame.wire_len(), 13);
    }

    #[test]
    fn test_decoded_frame_value_lookup() {
        let channel = Channel::from_name("altitude_2").unwrap();
        let frame = DecodedFrame {
            raw: RawFrame {
                type_mask: TypeMask::from_bits(2),
                timestamp: 1.0,
                payload: Bytes::new(),
                checksum: 0,
            },
            readings: vec![Reading {
                channel,
                value: Value::Float(5.0),
            }],
        };
        assert_eq!(frame.value(channel), Some(Value::Float(5.0)));
        assert_eq!(frame.value(Channel::from_name("altitude_1").unwrap()), None);
    }
}
