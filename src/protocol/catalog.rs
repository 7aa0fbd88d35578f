//! # Channel Catalog
//!
//! Static table describing every payload block the vehicle can downlink.
//!
//! Each block is selected by one bit of the frame's type mask. The catalog
//! gives its payload size, the scalar layout of its fields and the telemetry
//! channel each field is bound to. Blocks always appear on the wire in
//! ascending flag order, whatever order the sender set the bits in.

use std::fmt;

/// Packet type flag (one bit of the type mask per payload block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum PacketType {
    ArmStatus = 1,
    Altitude = 2,
    Acceleration = 4,
    GpsCoordinates = 8,
    BoardTemperature = 16,
    BoardVoltage = 32,
    BoardCurrent = 64,
    BatteryVoltage = 128,
    Magnetometer = 256,
    Gyroscope = 512,
    GpsSatellites = 1024,
    GpsGroundSpeed = 2048,
}

impl PacketType {
    /// Every packet type in ascending flag order
    pub const ALL: [PacketType; 12] = [
        PacketType::ArmStatus,
        PacketType::Altitude,
        PacketType::Acceleration,
        PacketType::GpsCoordinates,
        PacketType::BoardTemperature,
        PacketType::BoardVoltage,
        PacketType::BoardCurrent,
        PacketType::BatteryVoltage,
        PacketType::Magnetometer,
        PacketType::Gyroscope,
        PacketType::GpsSatellites,
        PacketType::GpsGroundSpeed,
    ];

    /// Bit value of this packet type in the type mask
    pub const fn flag(self) -> u16 {
        self as u16
    }

    /// Look up the packet type for a single-bit flag
    pub fn from_flag(flag: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.flag() == flag)
    }

    /// Catalog entry describing this packet type's payload
    pub fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self.flag().trailing_zeros() as usize]
    }

    /// Payload size in bytes
    pub fn payload_size(self) -> usize {
        self.entry().payload_size
    }

    /// Channels bound to this packet type's fields, in field order
    pub fn channels(self) -> impl Iterator<Item = Channel> {
        (0..self.entry().fields.len()).map(move |field| Channel {
            packet_type: self,
            field: field as u8,
        })
    }
}

/// Scalar type of a single payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One byte, any non-zero value is `true`
    Bool,
    /// Big-endian IEEE-754 single precision
    F32,
    /// Big-endian two's complement 16-bit integer
    I16,
}

impl FieldKind {
    /// Encoded size in bytes
    pub const fn size(self) -> usize {
        match self {
            FieldKind::Bool => 1,
            FieldKind::F32 => 4,
            FieldKind::I16 => 2,
        }
    }
}

/// One row of the channel catalog
#[derive(Debug)]
pub struct CatalogEntry {
    /// Packet type this entry describes
    pub packet_type: PacketType,

    /// Payload size in bytes
    pub payload_size: usize,

    /// Field layout, in wire order
    pub fields: &'static [FieldKind],

    /// Channel name for each field, in wire order
    pub channel_names: &'static [&'static str],
}

const BOOL_X3: &[FieldKind] = &[FieldKind::Bool; 3];
const F32_X1: &[FieldKind] = &[FieldKind::F32; 1];
const F32_X2: &[FieldKind] = &[FieldKind::F32; 2];
const F32_X3: &[FieldKind] = &[FieldKind::F32; 3];
const F32_X4: &[FieldKind] = &[FieldKind::F32; 4];
const I16_X1: &[FieldKind] = &[FieldKind::I16; 1];

/// The channel catalog, indexed by bit position of the flag
pub static CATALOG: [CatalogEntry; 12] = [
    CatalogEntry {
        packet_type: PacketType::ArmStatus,
        payload_size: 3,
        fields: BOOL_X3,
        channel_names: &["arm_status_1", "arm_status_2", "arm_status_3"],
    },
    CatalogEntry {
        packet_type: PacketType::Altitude,
        payload_size: 8,
        fields: F32_X2,
        channel_names: &["altitude_1", "altitude_2"],
    },
    CatalogEntry {
        packet_type: PacketType::Acceleration,
        payload_size: 12,
        fields: F32_X3,
        channel_names: &["acceleration_x", "acceleration_y", "acceleration_z"],
    },
    CatalogEntry {
        packet_type: PacketType::GpsCoordinates,
        payload_size: 8,
        fields: F32_X2,
        channel_names: &["gps_latitude", "gps_longitude"],
    },
    CatalogEntry {
        packet_type: PacketType::BoardTemperature,
        payload_size: 16,
        fields: F32_X4,
        channel_names: &[
            "board_1_temperature",
            "board_2_temperature",
            "board_3_temperature",
            "board_4_temperature",
        ],
    },
    CatalogEntry {
        packet_type: PacketType::BoardVoltage,
        payload_size: 16,
        fields: F32_X4,
        channel_names: &[
            "board_1_voltage",
            "board_2_voltage",
            "board_3_voltage",
            "board_4_voltage",
        ],
    },
    CatalogEntry {
        packet_type: PacketType::BoardCurrent,
        payload_size: 16,
        fields: F32_X4,
        channel_names: &[
            "board_1_current",
            "board_2_current",
            "board_3_current",
            "board_4_current",
        ],
    },
    CatalogEntry {
        packet_type: PacketType::BatteryVoltage,
        payload_size: 12,
        fields: F32_X3,
        channel_names: &["battery_1_voltage", "battery_2_voltage", "battery_3_voltage"],
    },
    CatalogEntry {
        packet_type: PacketType::Magnetometer,
        payload_size: 12,
        fields: F32_X3,
        channel_names: &["magnetometer_1", "magnetometer_2", "magnetometer_3"],
    },
    CatalogEntry {
        packet_type: PacketType::Gyroscope,
        payload_size: 12,
        fields: F32_X3,
        channel_names: &["gyroscope_x", "gyroscope_y", "gyroscope_z"],
    },
    CatalogEntry {
        packet_type: PacketType::GpsSatellites,
        payload_size: 2,
        fields: I16_X1,
        channel_names: &["gps_satellites"],
    },
    CatalogEntry {
        packet_type: PacketType::GpsGroundSpeed,
        payload_size: 4,
        fields: F32_X1,
        channel_names: &["gps_ground_speed"],
    },
];

/// A telemetry channel: one field of one packet type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel {
    pub packet_type: PacketType,
    pub field: u8,
}

impl Channel {
    /// Every channel in the catalog, in wire order
    pub fn all() -> impl Iterator<Item = Channel> {
        PacketType::ALL.into_iter().flat_map(PacketType::channels)
    }

    /// Find a channel by its name (e.g. `"altitude_1"`)
    pub fn from_name(name: &str) -> Option<Channel> {
        Self::all().find(|c| c.name() == name)
    }

    pub fn name(&self) -> &'static str {
        self.packet_type.entry().channel_names[self.field as usize]
    }

    pub fn kind(&self) -> FieldKind {
        self.packet_type.entry().fields[self.field as usize]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame type mask
///
/// Sent on the wire as a signed 16-bit integer; kept here as the raw bit
/// pattern so the sign bit is just another (unknown) flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeMask(u16);

impl TypeMask {
    /// Bits that have a catalog entry
    pub const KNOWN_BITS: u16 = 0x0FFF;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn from_wire(raw: i16) -> Self {
        Self(raw as u16)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn to_wire(self) -> i16 {
        self.0 as i16
    }

    /// Bits set in the mask that the catalog cannot size
    pub const fn unknown_bits(self) -> u16 {
        self.0 & !Self::KNOWN_BITS
    }

    pub const fn contains(self, packet_type: PacketType) -> bool {
        self.0 & packet_type.flag() != 0
    }

    pub const fn with(self, packet_type: PacketType) -> Self {
        Self(self.0 | packet_type.flag())
    }

    /// Individual flags set in the mask, lowest bit first
    pub fn flags(self) -> Flags {
        Flags { remaining: self.0 }
    }

    /// Packet types present in the mask, in ascending flag order
    ///
    /// Bits without a catalog entry are skipped; check [`Self::unknown_bits`]
    /// first when they matter.
    pub fn packet_types(self) -> impl Iterator<Item = PacketType> {
        self.flags().filter_map(PacketType::from_flag)
    }

    /// Total payload length for every known packet type in the mask
    pub fn payload_len(self) -> usize {
        self.packet_types().map(PacketType::payload_size).sum()
    }

    /// Total number of fields for every known packet type in the mask
    pub fn field_count(self) -> usize {
        self.packet_types().map(|t| t.entry().fields.len()).sum()
    }
}

impl FromIterator<PacketType> for TypeMask {
    fn from_iter<I: IntoIterator<Item = PacketType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Iterator over the single-bit flags of a mask
///
/// Repeatedly isolates the lowest set bit (`n & -n`) and clears it, so flags
/// come out in ascending order.
#[derive(Debug, Clone)]
pub struct Flags {
    remaining: u16,
}

impl Iterator for Flags {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.remaining == 0 {
            return None;
        }
        let lowest = self.remaining & self.remaining.wrapping_neg();
        self.remaining ^= lowest;
        Some(lowest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_indexed_by_bit_position() {
        for (i, entry) in CATALOG.iter().enumerate() {
            assert_eq!(entry.packet_type.flag(), 1 << i);
            assert_eq!(entry.packet_type.entry().packet_type, entry.packet_type);
        }
    }

    #[test]
    fn test_payload_size_matches_field_layout() {
        for entry in CATALOG.iter() {
            let layout: usize = entry.fields.iter().map(|f| f.size()).sum();
            assert_eq!(
                layout, entry.payload_size,
                "{:?} layout does not fill its payload",
                entry.packet_type
            );
            assert_eq!(entry.fields.len(), entry.channel_names.len());
        }
    }

    #[test]
    fn test_payload_sizes() {
        let sizes: Vec<usize> = PacketType::ALL.iter().map(|t| t.payload_size()).collect();
        assert_eq!(sizes, vec![3, 8, 12, 8, 16, 16, 16, 12, 12, 12, 2, 4]);
    }

    #[test]
    fn test_board_current_binds_four_channels() {
        let names: Vec<&str> = PacketType::BoardCurrent.channels().map(|c| c.name()).collect();
        assert_eq!(names.len(), 4);
        assert_eq!(names[3], "board_4_current");
    }

    #[test]
    fn test_channel_names_unique() {
        let mut names: Vec<&str> = Channel::all().map(|c| c.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 33);
    }

    #[test]
    fn test_channel_from_name() {
        let channel = Channel::from_name("gps_satellites").unwrap();
        assert_eq!(channel.packet_type, PacketType::GpsSatellites);
        assert_eq!(channel.kind(), FieldKind::I16);
        assert!(Channel::from_name("warp_drive").is_none());
    }

    #[test]
    fn test_flags_ascending() {
        let flags: Vec<u16> = TypeMask::from_bits(0b1010_0110).flags().collect();
        assert_eq!(flags, vec![2, 4, 32, 128]);
    }

    #[test]
    fn test_flags_include_sign_bit() {
        let mask = TypeMask::from_wire(-32767); // 0x8001
        let flags: Vec<u16> = mask.flags().collect();
        assert_eq!(flags, vec![1, 0x8000]);
        assert_eq!(mask.unknown_bits(), 0x8000);
    }

    #[test]
    fn test_mask_from_packet_types_any_order() {
        let mask: TypeMask = [PacketType::Acceleration, PacketType::Altitude].into_iter().collect();
        assert_eq!(mask.bits(), 6);
        let types: Vec<PacketType> = mask.packet_types().collect();
        assert_eq!(types, vec![PacketType::Altitude, PacketType::Acceleration]);
    }

    #[test]
    fn test_payload_len() {
        assert_eq!(TypeMask::empty().payload_len(), 0);
        assert_eq!(TypeMask::from_bits(6).payload_len(), 20);
        assert_eq!(TypeMask::from_bits(TypeMask::KNOWN_BITS).payload_len(), 121);
        assert_eq!(TypeMask::from_bits(TypeMask::KNOWN_BITS).field_count(), 33);
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(PacketType::from_flag(1024), Some(PacketType::GpsSatellites));
        assert_eq!(PacketType::from_flag(3), None);
        assert_eq!(PacketType::from_flag(4096), None);
    }
}
