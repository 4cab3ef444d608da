//! Named series and conversion results
//!
//! Series keep points in insertion order. Nothing here sorts, pads or
//! interpolates, so two series from the same result may differ in length.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A named, ordered sequence of points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Series name (column name or group label)
    pub name: String,
    /// Points in input row order
    pub points: Vec<Point>,
}

impl Series {
    /// Create an empty series
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    /// Create an empty series with room for `capacity` points
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a point
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Summary statistics over the non-null values
    pub fn stats(&self) -> SeriesStats {
        SeriesStats::from_points(&self.points)
    }
}

/// Summary statistics for a series
///
/// Null values are skipped. A series without any non-null value reports
/// zero for every field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Number of non-null values
    pub count: usize,
    /// Sum of non-null values
    pub total: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Average value
    pub avg: f64,
}

impl SeriesStats {
    fn from_points(points: &[Point]) -> Self {
        let values: Vec<f64> = points.iter().filter_map(|p| p.value).collect();

        if values.is_empty() {
            return Self {
                count: 0,
                total: 0.0,
                min: 0.0,
                max: 0.0,
                avg: 0.0,
            };
        }

        let total: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = total / values.len() as f64;

        Self {
            count: values.len(),
            total,
            min,
            max,
            avg,
        }
    }
}

/// The series produced by one conversion
///
/// Names are unique. Series are kept in the order their names were first
/// seen so output is deterministic, but consumers should treat the
/// collection as a set keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// All series, unique by name
    pub series: Vec<Series>,
}

impl QueryResult {
    /// Create a result from already-built series
    ///
    /// Series sharing a name are merged into the first one, its points
    /// followed by the later series' points.
    pub fn new(series: Vec<Series>) -> Self {
        let mut merged: Vec<Series> = Vec::with_capacity(series.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(series.len());

        for s in series {
            match index.get(&s.name) {
                Some(&idx) => merged[idx].points.extend(s.points),
                None => {
                    index.insert(s.name.clone(), merged.len());
                    merged.push(s);
                }
            }
        }

        Self { series: merged }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a series by name
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Check if there are no series
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Get number of series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Get series names
    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    /// Iterate over series
    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = Series;
    type IntoIter = std::vec::IntoIter<Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
