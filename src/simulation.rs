//! Synthetic Iliad telemetry for bench testing without a vehicle.
//!
//! Each frame carries a third of the catalog, rotating so that any three
//! consecutive frames cover every packet type. Values drift smoothly with the
//! frame timestamp.

use crate::error::Result;
use crate::protocol::catalog::{Channel, FieldKind, PacketType, TypeMask};
use crate::protocol::encoder::FrameBuilder;
use crate::protocol::frame::Value;

/// Frames needed to cover the whole catalog
pub const ROTATION_LEN: u64 = 3;

/// Generator of well-formed downlink frames
#[derive(Debug, Clone)]
pub struct SyntheticTelemetry {
    period: f32,
    frame_index: u64,
}

impl SyntheticTelemetry {
    /// Generator producing `rate_hz` frames per simulated second
    pub fn new(rate_hz: u32) -> Self {
        Self {
            period: 1.0 / rate_hz.max(1) as f32,
            frame_index: 0,
        }
    }

    /// Timestamp the next frame will carry
    pub fn timestamp(&self) -> f32 {
        self.frame_index as f32 * self.period
    }

    pub fn frames_generated(&self) -> u64 {
        self.frame_index
    }

    /// Packet types carried by the frame at `index`
    pub fn type_mask_for(index: u64) -> TypeMask {
        let slot = (index % ROTATION_LEN) as usize;
        PacketType::ALL
            .iter()
            .enumerate()
            .filter(|(i, _)| i % ROTATION_LEN as usize == slot)
            .map(|(_, t)| *t)
            .collect()
    }

    /// Encode the next frame
    pub fn next_frame(&mut self) -> Result<Vec<u8>> {
        let timestamp = self.timestamp();
        let mut builder = FrameBuilder::new(timestamp);

        for packet_type in Self::type_mask_for(self.frame_index).packet_types() {
            builder = builder.block(
                packet_type,
                packet_type.channels().map(|c| sample(c, timestamp)),
            );
        }

        let frame = builder.build()?;
        self.frame_index += 1;
        Ok(frame)
    }
}

/// Value of `channel` at time `t`
fn sample(channel: Channel, t: f32) -> Value {
    let field = channel.field as f32;

    match channel.kind() {
        FieldKind::Bool => Value::Bool((t / 5.0) as u64 % 2 == 0 || channel.field == 0),
        FieldKind::I16 => Value::Int(6 + ((t / 10.0) as i16 % 6)),
        FieldKind::F32 => {
            let (base, amplitude) = match channel.packet_type {
                PacketType::Altitude => (120.0, 15.0),
                PacketType::Acceleration => (0.0, 0.5),
                PacketType::GpsCoordinates => (45.0, 0.01),
                PacketType::BoardTemperature => (35.0, 3.0),
                PacketType::BoardVoltage => (5.0, 0.1),
                PacketType::BoardCurrent => (1.2, 0.3),
                PacketType::BatteryVoltage => (11.1, 0.4),
                PacketType::Magnetometer => (0.0, 40.0),
                PacketType::Gyroscope => (0.0, 2.0),
                PacketType::GpsGroundSpeed => (8.0, 2.0),
                PacketType::ArmStatus | PacketType::GpsSatellites => (0.0, 1.0),
            };
            Value::Float(base + amplitude * (0.5 * t + 0.7 * field).sin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder::FrameDecoder;
    use std::collections::BTreeSet;

    #[test]
    fn test_rotation_covers_catalog() {
        let mut covered = TypeMask::empty();
        for index in 0..ROTATION_LEN {
            let mask = SyntheticTelemetry::type_mask_for(index);
            assert_eq!(mask.bits() & covered.bits(), 0, "Rotation slots overlap");
            covered = TypeMask::from_bits(covered.bits() | mask.bits());
        }
        assert_eq!(covered.bits(), TypeMask::KNOWN_BITS);
    }

    #[test]
    fn test_frames_decode_with_increasing_timestamps() {
        let mut telemetry = SyntheticTelemetry::new(10);
        let mut decoder = FrameDecoder::new();
        for _ in 0..6 {
            decoder.push_bytes(&telemetry.next_frame().unwrap());
        }

        let mut timestamps = Vec::new();
        let mut channels = BTreeSet::new();
        while let Some(frame) = decoder.next_frame() {
            timestamps.push(frame.timestamp());
            channels.extend(frame.readings.iter().map(|r| r.channel));
        }

        assert_eq!(timestamps.len(), 6);
        assert!(timestamps.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(channels.len(), Channel::all().count());
        assert_eq!(decoder.stats().bytes_dropped, 0);
        assert_eq!(telemetry.frames_generated(), 6);
    }

    #[test]
    fn test_values_drift_smoothly() {
        let altitude = Channel::from_name("altitude_1").unwrap();
        let a = sample(altitude, 1.0).as_f32().unwrap();
        let b = sample(altitude, 1.1).as_f32().unwrap();
        assert!((a - b).abs() < 1.0);
        assert!((105.0..=135.0).contains(&a));
    }

    #[test]
    fn test_sample_matches_field_kind() {
        for channel in Channel::all() {
            assert_eq!(sample(channel, 3.0).kind(), channel.kind(), "{}", channel);
        }
    }
}
