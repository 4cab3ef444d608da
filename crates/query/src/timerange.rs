//! Dashboard time ranges
//!
//! Relative ranges end at the current instant, the way dashboard pickers
//! work (`1h` is "the last hour", not "since the start of that hour").

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::QueryError;

/// A time range for a dashboard query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range (inclusive)
    pub start: DateTime<Utc>,
    /// End of the range (inclusive)
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, QueryError> {
        if end < start {
            return Err(QueryError::Config(
                "time range end must not be before start".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Create a range from epoch-millisecond bounds
    pub fn from_millis(start_ms: i64, end_ms: i64) -> Result<Self, QueryError> {
        let start = millis_to_utc(start_ms)?;
        let end = millis_to_utc(end_ms)?;
        Self::new(start, end)
    }

    /// Parse a time range string relative to now
    ///
    /// Supported formats:
    /// - Relative: `30s`, `15m`, `1h`, `24h`, `7d`, `2w`
    /// - Predefined: `today`
    /// - Custom: `2024-01-01T00:00:00Z,2024-01-02T00:00:00Z` or epoch millis
    ///   `1482849300000,1482849720000`
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        Self::parse_at(s, Utc::now())
    }

    /// Parse a time range string relative to `now`
    pub fn parse_at(s: &str, now: DateTime<Utc>) -> Result<Self, QueryError> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("today") {
            let start = now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|t| t.and_utc())
                .unwrap_or(now);
            return Self::new(start, now);
        }

        if let Some((start, end)) = s.split_once(',') {
            return Self::new(parse_instant(start.trim())?, parse_instant(end.trim())?);
        }

        if let Some(duration) = parse_duration(s) {
            return Self::new(now - duration, now);
        }

        Err(QueryError::Config(format!(
            "unknown time range format: {}",
            s
        )))
    }

    /// Start as epoch seconds
    pub fn from_secs(&self) -> i64 {
        self.start.timestamp()
    }

    /// End as epoch seconds
    pub fn to_secs(&self) -> i64 {
        self.end.timestamp()
    }

    /// Start as epoch milliseconds
    pub fn from_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// End as epoch milliseconds
    pub fn to_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Get the duration of this range
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>, QueryError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| QueryError::Config(format!("timestamp out of range: {}", ms)))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, QueryError> {
    if let Ok(ms) = s.parse::<i64>() {
        return millis_to_utc(ms);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            QueryError::Config(format!(
                "invalid instant: {} (use RFC 3339 or epoch milliseconds)",
                s
            ))
        })
}

fn parse_duration(s: &str) -> Option<Duration> {
    let unit = s.chars().last()?;
    if !unit.is_ascii_alphabetic() {
        return None;
    }

    let num: i64 = s[..s.len() - 1].parse().ok()?;
    if num <= 0 {
        return None;
    }

    match unit.to_ascii_lowercase() {
        's' => Duration::try_seconds(num),
        'm' => Duration::try_minutes(num),
        'h' => Duration::try_hours(num),
        'd' => Duration::try_days(num),
        'w' => Duration::try_weeks(num),
        _ => None,
    }
}

#[cfg(test)]
#[path = "timerange_test.rs"]
mod timerange_test;
