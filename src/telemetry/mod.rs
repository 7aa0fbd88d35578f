//! # Telemetry Module
//!
//! Per-channel time-series storage for decoded downlink values.
//!
//! This module handles:
//! - One append-only series per catalog channel, created at startup
//! - Committing verified frames into their channels' series
//!
//! Series are never pruned. A long-running session grows without bound.

pub mod series;
pub mod store;

pub use series::{Point, TimeSeries};
pub use store::TelemetryStore;
