//! Plotline Time Series
//!
//! Container types shared by the query converter and its consumers:
//!
//! - [`Point`]: a single `(value, timestamp)` sample with a nullable value
//! - [`Series`]: a named, ordered sequence of points
//! - [`QueryResult`]: the set of series produced by one conversion
//!
//! # Usage
//!
//! ```
//! use plotline_timeseries::{make_point, QueryResult, Series};
//!
//! let mut series = Series::new("goodRate");
//! series.push(make_point(None, 1486113220000.0));
//! series.push(make_point(Some(19140.0), 1486113240000.0));
//!
//! let result = QueryResult::new(vec![series]);
//! assert_eq!(result.get("goodRate").map(|s| s.len()), Some(2));
//! ```

pub mod point;
pub mod series;


pub use point::{make_point, Point};
pub use series::{QueryResult, Series, SeriesStats};
