//! Query backend trait and SQL preparation

pub mod clickhouse;

use async_trait::async_trait;

use crate::error::QueryError;
use crate::timerange::TimeRange;

/// Query backend trait
///
/// A backend turns finished SQL into the raw `FORMAT JSON` payload. Decoding
/// and conversion happen in the engine.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Execute a SQL query and return the raw response body
    async fn fetch(&self, sql: &str) -> Result<Vec<u8>, QueryError>;

    /// Check if backend is available
    async fn health_check(&self) -> Result<(), QueryError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Validate SQL query - only allow SELECT and WITH (CTE) queries
///
/// This is a guardrail against accidental destructive queries from a
/// dashboard, not a security boundary.
pub fn validate_sql(sql: &str) -> Result<(), QueryError> {
    let trimmed = sql.trim();
    let upper = trimmed.to_uppercase();

    if !upper.starts_with("SELECT") && !upper.starts_with("WITH") {
        return Err(QueryError::InvalidSql(
            "only SELECT and WITH queries are allowed".to_string(),
        ));
    }

    if upper.contains(" INTO ") {
        return Err(QueryError::InvalidSql(
            "SELECT INTO is not allowed".to_string(),
        ));
    }

    // Allow trailing semicolon for convenience
    if trimmed.trim_end_matches(';').contains(';') {
        return Err(QueryError::InvalidSql(
            "multiple statements not allowed".to_string(),
        ));
    }

    Ok(())
}

/// Substitute time range macros
///
/// - `$fromMs` / `$toMs`: epoch milliseconds
/// - `$from` / `$to`: epoch seconds
///
/// A macro only matches as a whole word, so `$total` or `$fromDate` pass
/// through untouched.
pub fn expand_macros(sql: &str, range: &TimeRange) -> String {
    // longer names first, `$from` is a prefix of `$fromMs`
    let macros = [
        ("$fromMs", range.from_ms().to_string()),
        ("$toMs", range.to_ms().to_string()),
        ("$from", range.from_secs().to_string()),
        ("$to", range.to_secs().to_string()),
    ];

    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let hit = macros.iter().find(|(name, _)| {
            tail.starts_with(name) && !tail[name.len()..].starts_with(is_ident_char)
        });

        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('$');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Append `FORMAT JSON` unless the query already ends in a `FORMAT <name>`
/// clause
pub fn with_json_format(sql: &str) -> String {
    let body = sql.trim().trim_end_matches(';').trim_end();
    let words: Vec<&str> = body.split_whitespace().collect();

    let has_format = match words.as_slice() {
        [.., keyword, name] => {
            keyword.eq_ignore_ascii_case("FORMAT") && name.chars().all(is_ident_char)
        }
        _ => false,
    };

    if has_format {
        body.to_string()
    } else {
        format!("{} FORMAT JSON", body)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_validate_sql_select() {
        assert!(validate_sql("SELECT * FROM events").is_ok());
        assert!(validate_sql("  SELECT count(*) FROM logs  ").is_ok());
        assert!(validate_sql("select * from events").is_ok());
    }

    #[test]
    fn test_validate_sql_with() {
        assert!(validate_sql("WITH cte AS (SELECT 1) SELECT * FROM cte").is_ok());
    }

    #[test]
    fn test_validate_sql_invalid() {
        assert!(validate_sql("INSERT INTO events VALUES (1)").is_err());
        assert!(validate_sql("DROP TABLE events").is_err());
        assert!(validate_sql("ALTER TABLE events DELETE WHERE 1").is_err());
        assert!(validate_sql("SELECT * INTO backup FROM events").is_err());
    }

    #[test]
    fn test_validate_sql_statements() {
        assert!(validate_sql("SELECT 1; DROP TABLE events").is_err());
        assert!(validate_sql("SELECT 1;").is_ok());
    }

    #[test]
    fn test_expand_macros() {
        let range = TimeRange::new(
            Utc.timestamp_millis_opt(1482849300000).unwrap(),
            Utc.timestamp_millis_opt(1482849720000).unwrap(),
        )
        .unwrap();

        let sql = "SELECT t FROM x WHERE t >= $from AND t <= $to AND ms BETWEEN $fromMs AND $toMs";
        assert_eq!(
            expand_macros(sql, &range),
            "SELECT t FROM x WHERE t >= 1482849300 AND t <= 1482849720 \
             AND ms BETWEEN 1482849300000 AND 1482849720000"
        );
    }

    #[test]
    fn test_expand_macros_whole_words() {
        let range = TimeRange::from_millis(5000, 9000).unwrap();

        assert_eq!(
            expand_macros("SELECT $total, $fromDate, $to_x FROM t", &range),
            "SELECT $total, $fromDate, $to_x FROM t"
        );
        assert_eq!(
            expand_macros("WHERE t BETWEEN $from AND $to)", &range),
            "WHERE t BETWEEN 5 AND 9)"
        );
        assert_eq!(expand_macros("x=$fromMs,y=$toMs", &range), "x=5000,y=9000");
        assert_eq!(expand_macros("cost > $5 AND $", &range), "cost > $5 AND $");
    }

    #[test]
    fn test_expand_macros_none() {
        let range = TimeRange::from_millis(0, 1000).unwrap();
        assert_eq!(expand_macros("SELECT 1", &range), "SELECT 1");
    }

    #[test]
    fn test_with_json_format() {
        assert_eq!(with_json_format("SELECT 1"), "SELECT 1 FORMAT JSON");
        assert_eq!(with_json_format("SELECT 1;"), "SELECT 1 FORMAT JSON");
        assert_eq!(
            with_json_format("SELECT 1 FORMAT JSONCompact"),
            "SELECT 1 FORMAT JSONCompact"
        );
        assert_eq!(with_json_format("select 1 format JSON"), "select 1 format JSON");
    }

    #[test]
    fn test_with_json_format_column_named_format() {
        assert_eq!(
            with_json_format("SELECT format FROM t"),
            "SELECT format FROM t FORMAT JSON"
        );
        assert_eq!(
            with_json_format("SELECT t, format, count() FROM logs GROUP BY t, format"),
            "SELECT t, format, count() FROM logs GROUP BY t, format FORMAT JSON"
        );
        assert_eq!(
            with_json_format("SELECT 'FORMAT CSV' AS s"),
            "SELECT 'FORMAT CSV' AS s FORMAT JSON"
        );
    }
}
