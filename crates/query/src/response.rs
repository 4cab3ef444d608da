//! ClickHouse `FORMAT JSON` response decoding
//!
//! The payload looks like:
//!
//! ```json
//! {
//!   "meta": [{"name": "t", "type": "UInt64"}, {"name": "rate", "type": "Float64"}],
//!   "data": [{"t": 1486113220000, "rate": null}, {"t": "1486113240000", "rate": "81"}],
//!   "rows": 2,
//!   "statistics": {"elapsed": 0.37, "rows_read": 15645250, "bytes_read": 695422779}
//! }
//! ```
//!
//! ClickHouse quotes 64-bit integers by default, so the same column can hold
//! JSON numbers in one row and numeric strings in the next. Cells are decoded
//! once into [`Cell`] and never rejected for their shape here; coercion is the
//! converter's job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Column definition from the `meta` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name
    pub name: String,

    /// ClickHouse type, e.g. `UInt64` or `Array(Tuple(String, UInt64))`
    pub r#type: String,
}

impl ColumnMeta {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, r#type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r#type: r#type.into(),
        }
    }

    /// Check if the declared type is an array of tuples
    ///
    /// `Nullable(...)` and `LowCardinality(...)` wrappers are ignored.
    pub fn is_tuple_array(&self) -> bool {
        strip_wrappers(&self.r#type).starts_with("Array(Tuple(")
    }
}

fn strip_wrappers(ch_type: &str) -> &str {
    let mut inner = ch_type.trim();
    loop {
        let stripped = ["Nullable(", "LowCardinality("].iter().find_map(|prefix| {
            inner
                .strip_prefix(prefix)
                .and_then(|s| s.strip_suffix(')'))
        });
        match stripped {
            Some(s) => inner = s.trim(),
            None => return inner,
        }
    }
}

/// One `[label, value]` element of a grouped-array cell
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    /// Output series name
    pub label: String,
    /// Always `Null`, `Number` or `Text`
    pub value: Cell,
}

/// A single decoded cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// JSON `null`
    Null,
    /// JSON number
    Number(f64),
    /// JSON string, possibly numeric
    Text(String),
    /// Array of `[label, value]` pairs (possibly empty)
    PairArray(Vec<Pair>),
    /// Any other JSON shape, kept as its JSON text
    Unsupported(String),
}

impl Cell {
    /// Check if this cell is JSON `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Number(n) => match n.as_f64() {
                Some(f) => Cell::Number(f),
                None => Cell::Unsupported(n.to_string()),
            },
            Value::String(s) => Cell::Text(s),
            Value::Array(items) => match pairs_from_json(&items) {
                Some(pairs) => Cell::PairArray(pairs),
                None => Cell::Unsupported(Value::Array(items).to_string()),
            },
            other => Cell::Unsupported(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Cell::from)
    }
}

fn pairs_from_json(items: &[Value]) -> Option<Vec<Pair>> {
    items
        .iter()
        .map(|item| {
            let [label, value] = item.as_array()?.as_slice() else {
                return None;
            };
            let label = label.as_str()?;
            match value {
                Value::Null | Value::Number(_) | Value::String(_) => Some(Pair {
                    label: label.to_string(),
                    value: Cell::from(value.clone()),
                }),
                _ => None,
            }
        })
        .collect()
}

/// One row of the `data` block, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ResponseRow {
    cells: HashMap<String, Cell>,
}

impl ResponseRow {
    /// Get the cell for a column, `None` if the row omits it
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Number of cells in this row
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, Cell)> for ResponseRow {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Execution statistics reported by ClickHouse
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    /// Server-side execution time in seconds
    pub elapsed: f64,
    /// Rows scanned
    pub rows_read: u64,
    /// Bytes scanned
    pub bytes_read: u64,
}

/// Decoded response
///
/// `row_count` is whatever the server reported and is not checked against
/// `data.len()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetResponse {
    /// Column definitions, in column order
    pub meta: Vec<ColumnMeta>,

    /// Rows, in server order
    pub data: Vec<ResponseRow>,

    /// Row count reported by the server
    #[serde(rename = "rows")]
    pub row_count: usize,

    /// Absent when `output_format_write_statistics = 0`
    #[serde(default)]
    pub statistics: Statistics,
}

impl TargetResponse {
    /// The timestamp column (first `meta` entry)
    pub fn timestamp_column(&self) -> Option<&ColumnMeta> {
        self.meta.first()
    }
}

/// Decode a raw response payload
pub fn decode(bytes: &[u8]) -> Result<TargetResponse, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode a response payload held in a string
pub fn decode_str(text: &str) -> Result<TargetResponse, DecodeError> {
    decode(text.as_bytes())
}

#[cfg(test)]
#[path = "response_test.rs"]
mod response_test;
