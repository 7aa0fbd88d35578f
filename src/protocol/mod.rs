//! # Iliad Downlink Protocol Module
//!
//! Implementation of the Iliad telemetry framing protocol.
//!
//! This module handles:
//! - The channel catalog (type mask bits, payload layouts, channel bindings)
//! - CRC16/CCITT checksum calculation
//! - Inbound byte buffering with non-committing parse cursors
//! - Frame decoding and single-byte resynchronization
//! - Frame encoding for simulators and tests

pub mod buffer;
pub mod catalog;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod resync;
