//! Response to time series conversion
//!
//! The first `meta` column holds epoch-millisecond timestamps. Every other
//! column is either:
//!
//! - **scalar**: one nullable number per row, emitted as a series named after
//!   the column
//! - **grouped array**: `[[label, value], ...]` per row, where every label
//!   becomes its own series
//!
//! Points are appended in row order. Labels missing from a row get no point
//! for that row, so series lengths can differ. The first bad cell fails the
//! whole conversion.

use std::collections::HashMap;
use std::str::FromStr;

use plotline_timeseries::{make_point, Point, QueryResult, Series};
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::response::{Cell, ColumnMeta, ResponseRow, TargetResponse};

// =============================================================================
// Options
// =============================================================================

/// How value columns are told apart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnClassification {
    /// Trust the declared type: `Array(Tuple(...))` is grouped, the rest scalar
    #[default]
    DeclaredType,
    /// Look at the first non-null cell of the column across all rows
    FirstNonNull,
}

impl FromStr for ColumnClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "declared_type" | "declared" => Ok(Self::DeclaredType),
            "first_non_null" | "scan" => Ok(Self::FirstNonNull),
            _ => Err(format!("unknown classification: {}", s)),
        }
    }
}

/// What happens when one series gets two points for the same row
///
/// This happens when a label equals a scalar column name, or a label is
/// repeated within a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later write replaces the earlier point for that row
    #[default]
    Overwrite,
    /// Fail with [`ConversionError::NameCollision`]
    Reject,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("unknown collision policy: {}", s)),
        }
    }
}

/// Conversion options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Column classification policy
    pub classify: ColumnClassification,
    /// Series name collision policy
    pub collisions: CollisionPolicy,
}

impl ConvertOptions {
    /// Set the classification policy
    pub fn with_classification(mut self, classify: ColumnClassification) -> Self {
        self.classify = classify;
        self
    }

    /// Set the collision policy
    pub fn with_collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.collisions = collisions;
        self
    }
}

// =============================================================================
// Conversion
// =============================================================================

/// Convert a decoded response with default options
pub fn convert(response: &TargetResponse) -> Result<QueryResult, ConversionError> {
    convert_with(response, &ConvertOptions::default())
}

/// Convert a decoded response
pub fn convert_with(
    response: &TargetResponse,
    options: &ConvertOptions,
) -> Result<QueryResult, ConversionError> {
    let Some((ts_column, value_columns)) = response.meta.split_first() else {
        if response.data.is_empty() {
            return Ok(QueryResult::empty());
        }
        return Err(ConversionError::BadTimestamp { row: 0 });
    };

    let columns: Vec<(&ColumnMeta, ColumnKind)> = value_columns
        .iter()
        .map(|column| (column, classify(column, &response.data, options.classify)))
        .collect();

    // row_count comes from the server; never allocate past the real data
    let capacity = response.row_count.min(response.data.len());
    let mut acc = Accumulator::new(options.collisions, capacity);

    for (column, kind) in &columns {
        if *kind == ColumnKind::Scalar {
            acc.register(&column.name);
        }
    }

    for (row_idx, row) in response.data.iter().enumerate() {
        let timestamp = match row.get(&ts_column.name).map(coerce) {
            Some(Ok(Some(ts))) if ts.is_finite() => ts,
            _ => return Err(ConversionError::BadTimestamp { row: row_idx }),
        };

        for (column, kind) in &columns {
            let bad_value = || ConversionError::BadValue {
                column: column.name.clone(),
                row: row_idx,
            };

            match (kind, row.get(&column.name)) {
                (ColumnKind::Scalar, None) => {
                    acc.push(&column.name, row_idx, make_point(None, timestamp))?;
                }
                (ColumnKind::Scalar, Some(cell)) => {
                    let value = coerce(cell).map_err(|_| bad_value())?;
                    acc.push(&column.name, row_idx, make_point(value, timestamp))?;
                }
                (ColumnKind::Grouped, None | Some(Cell::Null)) => {}
                (ColumnKind::Grouped, Some(Cell::PairArray(pairs))) => {
                    for pair in pairs {
                        let value = coerce(&pair.value).map_err(|_| bad_value())?;
                        acc.push(&pair.label, row_idx, make_point(value, timestamp))?;
                    }
                }
                (ColumnKind::Grouped, Some(_)) => return Err(bad_value()),
            }
        }
    }

    let result = acc.finish();

    tracing::debug!(
        rows = response.data.len(),
        columns = response.meta.len(),
        series = result.len(),
        "response converted"
    );

    Ok(result)
}

// =============================================================================
// Classification and Coercion
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Scalar,
    Grouped,
}

fn classify(
    column: &ColumnMeta,
    rows: &[ResponseRow],
    policy: ColumnClassification,
) -> ColumnKind {
    match policy {
        ColumnClassification::DeclaredType => {
            if column.is_tuple_array() {
                ColumnKind::Grouped
            } else {
                ColumnKind::Scalar
            }
        }
        ColumnClassification::FirstNonNull => {
            let first = rows
                .iter()
                .filter_map(|row| row.get(&column.name))
                .find(|cell| !cell.is_null());
            match first {
                Some(Cell::PairArray(_)) => ColumnKind::Grouped,
                Some(_) => ColumnKind::Scalar,
                // nothing to look at, fall back to the declared type
                None => classify(column, rows, ColumnClassification::DeclaredType),
            }
        }
    }
}

/// Cell is not a number, numeric string, or null
#[derive(Debug)]
struct NotNumeric;

/// Coerce a scalar cell: null stays `None`, strings must parse as a whole
fn coerce(cell: &Cell) -> Result<Option<f64>, NotNumeric> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Number(n) => Ok(Some(*n)),
        Cell::Text(s) => s.parse::<f64>().map(Some).map_err(|_| NotNumeric),
        Cell::PairArray(_) | Cell::Unsupported(_) => Err(NotNumeric),
    }
}

// =============================================================================
// Accumulator
// =============================================================================

struct SeriesBuilder {
    series: Series,
    last_row: Option<usize>,
}

/// Builds series in first-seen order, one point per series per row
struct Accumulator {
    policy: CollisionPolicy,
    capacity: usize,
    builders: Vec<SeriesBuilder>,
    index: HashMap<String, usize>,
}

impl Accumulator {
    fn new(policy: CollisionPolicy, capacity: usize) -> Self {
        Self {
            policy,
            capacity,
            builders: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn register(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.builders.len();
        self.builders.push(SeriesBuilder {
            series: Series::with_capacity(name, self.capacity),
            last_row: None,
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn push(&mut self, name: &str, row: usize, point: Point) -> Result<(), ConversionError> {
        let idx = self.register(name);
        let builder = &mut self.builders[idx];

        if builder.last_row == Some(row) {
            return match self.policy {
                CollisionPolicy::Overwrite => {
                    if let Some(last) = builder.series.points.last_mut() {
                        *last = point;
                    }
                    Ok(())
                }
                CollisionPolicy::Reject => Err(ConversionError::NameCollision {
                    name: name.to_string(),
                    row,
                }),
            };
        }

        builder.series.push(point);
        builder.last_row = Some(row);
        Ok(())
    }

    fn finish(self) -> QueryResult {
        QueryResult::new(self.builders.into_iter().map(|b| b.series).collect())
    }
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod convert_test;
