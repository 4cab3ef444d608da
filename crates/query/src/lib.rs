//! Plotline Query - ClickHouse results as dashboard time series
//!
//! Turns a ClickHouse `FORMAT JSON` response into named time series:
//!
//! - **Decoder** ([`response`]): raw bytes to [`TargetResponse`], keeping the
//!   loosely typed cells as [`Cell`]
//! - **Converter** ([`convert`]): scalar columns become one series each,
//!   `Array(Tuple(String, ...))` columns become one series per label
//! - **Backend** ([`backend`]): runs SQL against ClickHouse over HTTP
//!
//! # Usage
//!
//! ```ignore
//! use plotline_query::{ClickHouseBackend, ClickHouseConfig, TimeRange, TimeSeriesEngine};
//!
//! let backend = ClickHouseBackend::new(&ClickHouseConfig::new("http://localhost:8123", "default"));
//! let engine = TimeSeriesEngine::new(backend);
//!
//! let range = TimeRange::parse("1h")?;
//! let result = engine
//!     .query("SELECT t, count() AS hits FROM requests WHERE ts >= $from GROUP BY t ORDER BY t", &range)
//!     .await?;
//! ```
//!
//! Converting a saved response needs no backend:
//!
//! ```ignore
//! let response = plotline_query::decode(&bytes)?;
//! let result = plotline_query::convert(&response)?;
//! ```

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod response;
pub mod timerange;


// Re-exports
pub use backend::clickhouse::ClickHouseBackend;
pub use backend::{expand_macros, validate_sql, with_json_format, QueryBackend};
pub use config::ClickHouseConfig;
pub use convert::{convert, convert_with, CollisionPolicy, ColumnClassification, ConvertOptions};
pub use error::{ConversionError, DecodeError, QueryError};
pub use plotline_timeseries::{make_point, Point, QueryResult, Series, SeriesStats};
pub use response::{decode, decode_str, Cell, ColumnMeta, Pair, ResponseRow, Statistics, TargetResponse};
pub use timerange::TimeRange;

use std::sync::Arc;

/// Runs dashboard queries and converts the responses to series
pub struct TimeSeriesEngine {
    backend: Arc<dyn QueryBackend>,
    options: ConvertOptions,
}

impl TimeSeriesEngine {
    /// Create a new engine with a specific backend
    pub fn new(backend: impl QueryBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            options: ConvertOptions::default(),
        }
    }

    /// Set conversion options
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Current conversion options
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Execute a query over a time range and convert the result
    pub async fn query(&self, sql: &str, range: &TimeRange) -> Result<QueryResult, QueryError> {
        let response = self.query_raw(sql, range).await?;
        Ok(convert_with(&response, &self.options)?)
    }

    /// Execute a query over a time range and return the decoded response
    pub async fn query_raw(
        &self,
        sql: &str,
        range: &TimeRange,
    ) -> Result<TargetResponse, QueryError> {
        validate_sql(sql)?;

        let sql = with_json_format(&expand_macros(sql, range));
        let body = self.backend.fetch(&sql).await?;
        let response = decode(&body)?;

        tracing::debug!(
            backend = self.backend.name(),
            rows = response.row_count,
            elapsed = response.statistics.elapsed,
            rows_read = response.statistics.rows_read,
            "query response decoded"
        );

        Ok(response)
    }

    /// Check if the backend is healthy
    pub async fn health_check(&self) -> Result<(), QueryError> {
        self.backend.health_check().await
    }

    /// Get the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

/// Output format for converted series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON array of series
    Json,
    /// CSV, one line per point
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
