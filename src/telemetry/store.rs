//! Time-series store: one series per catalog channel.

use std::collections::BTreeMap;

use crate::protocol::catalog::Channel;
use crate::protocol::frame::DecodedFrame;

use super::series::TimeSeries;

/// Every channel's time series
///
/// All catalog channels exist from construction, so a channel that has not
/// received data yet reads as an empty series.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    series: BTreeMap<Channel, TimeSeries>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self {
            series: Channel::all().map(|c| (c, TimeSeries::new())).collect(),
        }
    }

    /// Commit a verified frame, appending one point per reading
    ///
    /// # Returns
    ///
    /// * `usize` - Number of points appended
    pub fn ingest(&mut self, frame: &DecodedFrame) -> usize {
        let timestamp = frame.timestamp();
        let mut appended = 0;

        for reading in &frame.readings {
            self.series
                .entry(reading.channel)
                .or_default()
                .push(timestamp, reading.value);
            appended += 1;
        }

        appended
    }

    pub fn series(&self, channel: Channel) -> Option<&TimeSeries> {
        self.series.get(&channel)
    }

    /// Series for a channel name (e.g. `"gps_latitude"`)
    pub fn series_by_name(&self, name: &str) -> Option<&TimeSeries> {
        Channel::from_name(name).and_then(|c| self.series(c))
    }

    /// All series in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &TimeSeries)> {
        self.series.iter().map(|(c, s)| (*c, s))
    }

    /// Total number of points across all channels
    pub fn total_points(&self) -> usize {
        self.series.values().map(TimeSeries::len).sum()
    }
}
