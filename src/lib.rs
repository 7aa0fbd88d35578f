//! # Iliad Downlink Library
//!
//! Ground-station side of the Iliad vehicle telemetry link.
//!
//! This library decodes CRC-checked, bitmask-selected telemetry frames from a
//! serial byte stream, resynchronizes after corruption, and keeps one time
//! series per telemetry channel. It also encodes frames, for simulators and
//! tests.

pub mod config;
pub mod downlink;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod serial;
pub mod simulation;
pub mod telemetry;
