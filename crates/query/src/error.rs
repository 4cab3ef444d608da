//! Query error types

/// The payload is not a structurally valid JSON response
#[derive(Debug, thiserror::Error)]
#[error("invalid response payload: {0}")]
pub struct DecodeError(String);

impl DecodeError {
    /// Create a decode error from a message
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError(err.to_string())
    }
}

/// A cell could not be turned into a point
///
/// Row indexes are zero-based positions in the response `data` array.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Timestamp missing, null, or not numeric
    #[error("bad timestamp at row {row}")]
    BadTimestamp { row: usize },

    /// Value could not be coerced to a number
    #[error("bad value in column '{column}' at row {row}")]
    BadValue { column: String, row: usize },

    /// Two writes to one series within a row (collision policy `reject`)
    #[error("series '{name}' written twice at row {row}")]
    NameCollision { name: String, row: usize },
}

/// Errors that can occur during query execution
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// Query execution failed
    #[error("query execution failed: {0}")]
    Execution(String),

    /// Invalid SQL (only SELECT/WITH allowed)
    #[error("invalid SQL: {0}")]
    InvalidSql(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Response payload could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Response could not be converted to series
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
