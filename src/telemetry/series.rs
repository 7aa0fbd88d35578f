//! Append-only time series.

use crate::protocol::frame::Value;

/// One sample of a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Sender timestamp of the frame the value came from
    pub timestamp: f32,
    pub value: Value,
}

/// Ordered samples of one channel
///
/// Order is decode order. Timestamps are not guaranteed to be monotonic:
/// the sender's clock may jump and a resynchronization can surface an older
/// frame after a newer one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<Point>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample
    pub fn push(&mut self, timestamp: f32, value: Value) {
        self.points.push(Point { timestamp, value });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// `(timestamp, value)` pairs for a float channel
    pub fn f32_samples(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.as_f32().map(|v| (p.timestamp, v)))
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut series = TimeSeries::new();
        series.push(2.0, Value::Float(20.0));
        series.push(1.0, Value::Float(10.0)); // Backward timestamp is kept as-is
        series.push(3.0, Value::Float(30.0));

        let timestamps: Vec<f32> = series.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![2.0, 1.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().unwrap().value, Value::Float(30.0));
    }

    #[test]
    fn test_duplicates_kept() {
        let mut series = TimeSeries::new();
        series.push(0.0, Value::Bool(true));
        series.push(0.0, Value::Bool(true));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_f32_samples() {
        let mut series = TimeSeries::new();
        series.push(0.5, Value::Float(1.25));
        series.push(1.0, Value::Int(3));

        let samples: Vec<(f32, f32)> = series.f32_samples().collect();
        assert_eq!(samples, vec![(0.5, 1.25)]);
    }
}
