//! Time series points

use serde::{Deserialize, Serialize};

/// A single sample in a time series
///
/// `value` is `None` when the source cell was an explicit null. A missing
/// value is never stored as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The sample value, `None` for an explicit missing value
    pub value: Option<f64>,
    /// Epoch milliseconds
    pub timestamp_ms: f64,
}

impl Point {
    /// Create a new point
    pub fn new(value: Option<f64>, timestamp_ms: f64) -> Self {
        Self {
            value,
            timestamp_ms,
        }
    }

    /// Check if this point carries an explicit missing value
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// Build a point from a nullable value and an epoch-millisecond timestamp
pub fn make_point(value: Option<f64>, timestamp_ms: f64) -> Point {
    Point::new(value, timestamp_ms)
}
