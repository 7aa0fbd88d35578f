//! # Iliad Frame Encoder
//!
//! Produces wire frames from structured values. The inverse of the decoder,
//! used by the simulator and by tests to feed the decode path.

use std::collections::BTreeMap;

use bytes::{BufMut, BytesMut};

use super::catalog::{FieldKind, PacketType, TypeMask};
use super::crc::{crc16_ccitt, footer_value};
use super::frame::{Value, CHECKSUM_LEN, HEADER_LEN};
use crate::error::{DownlinkError, Result};

/// Encode a complete frame
///
/// # Arguments
///
/// * `type_mask` - Packet types present in the frame
/// * `timestamp` - Sender timestamp
/// * `values` - Field values flattened in ascending flag order, each packet
///   type contributing exactly its catalog field count
///
/// # Returns
///
/// * `Result<Vec<u8>>` - mask + timestamp + payload + checksum footer
///
/// # Errors
///
/// Returns `Encode` if the mask has bits outside the catalog, if the number
/// of values does not match the selected packet types, or if a value's kind
/// does not match its field.
///
/// # Examples
///
/// ```
/// use iliad_downlink::protocol::catalog::{PacketType, TypeMask};
/// use iliad_downlink::protocol::encoder::encode_frame;
/// use iliad_downlink::protocol::frame::Value;
///
/// let mask = TypeMask::empty().with(PacketType::ArmStatus);
/// let values = [Value::Bool(true); 3];
/// let frame = encode_frame(mask, 0.0, &values).unwrap();
/// assert_eq!(frame.len(), 2 + 4 + 3 + 4);
/// ```
pub fn encode_frame(type_mask: TypeMask, timestamp: f32, values: &[Value]) -> Result<Vec<u8>> {
    if type_mask.unknown_bits() != 0 {
        return Err(DownlinkError::Encode(format!(
            "type mask 0x{:04X} has bits outside the catalog (0x{:04X})",
            type_mask.bits(),
            type_mask.unknown_bits()
        )));
    }

    let expected = type_mask.field_count();
    if values.len() != expected {
        return Err(DownlinkError::Encode(format!(
            "type mask 0x{:04X} needs {} values, got {}",
            type_mask.bits(),
            expected,
            values.len()
        )));
    }

    let payload_len = type_mask.payload_len();
    let mut frame = BytesMut::with_capacity(HEADER_LEN + payload_len + CHECKSUM_LEN);
    frame.put_i16(type_mask.to_wire());
    frame.put_f32(timestamp);

    let mut values = values.iter();
    for channel in type_mask.packet_types().flat_map(PacketType::channels) {
        // Length was checked above
        let Some(value) = values.next() else { break };
        match (channel.kind(), *value) {
            (FieldKind::Bool, Value::Bool(v)) => frame.put_u8(v as u8),
            (FieldKind::F32, Value::Float(v)) => frame.put_f32(v),
            (FieldKind::I16, Value::Int(v)) => frame.put_i16(v),
            (kind, value) => {
                return Err(DownlinkError::Encode(format!(
                    "{} expects {:?}, got {:?}",
                    channel, kind, value
                )));
            }
        }
    }

    let crc = crc16_ccitt(&frame);
    frame.put_u32(footer_value(crc));

    Ok(frame.to_vec())
}

/// Builder for frames assembled one packet type at a time
///
/// Blocks may be added in any order; they are laid out in ascending flag
/// order when the frame is built.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    timestamp: f32,
    blocks: BTreeMap<PacketType, Vec<Value>>,
}

impl FrameBuilder {
    pub fn new(timestamp: f32) -> Self {
        Self {
            timestamp,
            blocks: BTreeMap::new(),
        }
    }

    /// Add (or replace) one packet type's field values
    pub fn block<V, I>(mut self, packet_type: PacketType, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.blocks
            .insert(packet_type, values.into_iter().map(Into::into).collect());
        self
    }

    /// Type mask selected so far
    pub fn type_mask(&self) -> TypeMask {
        self.blocks.keys().copied().collect()
    }

    /// Encode the frame
    ///
    /// # Errors
    ///
    /// Returns `Encode` if any block has the wrong number or kind of values.
    pub fn build(&self) -> Result<Vec<u8>> {
        for (packet_type, values) in &self.blocks {
            let fields = packet_type.entry().fields.len();
            if values.len() != fields {
                return Err(DownlinkError::Encode(format!(
                    "{:?} needs {} values, got {}",
                    packet_type,
                    fields,
                    values.len()
                )));
            }
        }

        let values: Vec<Value> = self.blocks.values().flatten().copied().collect();
        encode_frame(self.type_mask(), self.timestamp, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::crc::crc16_ccitt;

    #[test]
    fn test_encode_arm_status_frame() {
        let mask = TypeMask::from_bits(PacketType::ArmStatus.flag());
        let frame = encode_frame(mask, 0.0, &[Value::Bool(true); 3]).unwrap();

        assert_eq!(&frame[..2], &[0x00, 0x01]); // Mask
        assert_eq!(&frame[2..6], &[0x00; 4]); // Timestamp 0.0
        assert_eq!(&frame[6..9], &[0x01, 0x01, 0x01]); // Payload

        let crc = crc16_ccitt(&frame[..9]);
        assert_eq!(&frame[9..], &u32::from(crc).to_be_bytes());
    }

    #[test]
    fn test_encode_empty_mask() {
        let frame = encode_frame(TypeMask::empty(), 2.5, &[]).unwrap();
        assert_eq!(frame.len(), HEADER_LEN + CHECKSUM_LEN);
        assert_eq!(&frame[2..6], &2.5f32.to_be_bytes());
    }

    #[test]
    fn test_encode_ascending_flag_order() {
        // Altitude (2 floats) then acceleration (3 floats)
        let mask = TypeMask::from_bits(6);
        let values: Vec<Value> = [1.0f32, 2.0, 3.0, 4.0, 5.0].into_iter().map(Value::from).collect();
        let frame = encode_frame(mask, 0.0, &values).unwrap();

        assert_eq!(frame.len(), HEADER_LEN + 20 + CHECKSUM_LEN);
        for (i, expected) in [1.0f32, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
            let start = HEADER_LEN + i * 4;
            assert_eq!(&frame[start..start + 4], &expected.to_be_bytes());
        }
    }

    #[test]
    fn test_encode_gps_satellites_is_i16() {
        let mask = TypeMask::from_bits(PacketType::GpsSatellites.flag());
        let frame = encode_frame(mask, 0.0, &[Value::Int(-2)]).unwrap();
        assert_eq!(&frame[HEADER_LEN..HEADER_LEN + 2], &[0xFF, 0xFE]);
    }

    #[test]
    fn test_encode_wrong_value_count() {
        let mask = TypeMask::from_bits(PacketType::Altitude.flag());
        let result = encode_frame(mask, 0.0, &[Value::Float(1.0)]);
        assert!(matches!(result, Err(DownlinkError::Encode(_))));
    }

    #[test]
    fn test_encode_wrong_value_kind() {
        let mask = TypeMask::from_bits(PacketType::ArmStatus.flag());
        let values = [Value::Bool(true), Value::Float(1.0), Value::Bool(false)];
        let result = encode_frame(mask, 0.0, &values);
        assert!(matches!(result, Err(DownlinkError::Encode(_))));
    }

    #[test]
    fn test_encode_unknown_bits_rejected() {
        let result = encode_frame(TypeMask::from_bits(0x1000), 0.0, &[]);
        assert!(matches!(result, Err(DownlinkError::Encode(_))));
    }

    #[test]
    fn test_builder_orders_blocks() {
        let built = FrameBuilder::new(1.0)
            .block(PacketType::Acceleration, [3.0f32, 4.0, 5.0])
            .block(PacketType::Altitude, [1.0f32, 2.0])
            .build()
            .unwrap();

        let values: Vec<Value> = [1.0f32, 2.0, 3.0, 4.0, 5.0].into_iter().map(Value::from).collect();
        let direct = encode_frame(TypeMask::from_bits(6), 1.0, &values).unwrap();

        assert_eq!(built, direct);
    }

    #[test]
    fn test_builder_block_field_count() {
        let result = FrameBuilder::new(0.0)
            .block(PacketType::Altitude, [1.0f32, 2.0, 3.0])
            .block(PacketType::ArmStatus, [true, true, true])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_different_data_different_checksum() {
        let mask = TypeMask::from_bits(PacketType::GpsGroundSpeed.flag());
        let frame1 = encode_frame(mask, 0.0, &[Value::Float(10.0)]).unwrap();
        let frame2 = encode_frame(mask, 0.0, &[Value::Float(11.0)]).unwrap();
        assert_ne!(frame1[frame1.len() - 2..], frame2[frame2.len() - 2..]);
    }
}
