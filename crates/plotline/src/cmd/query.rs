//! Query command - run a dashboard query against ClickHouse
//!
//! # Usage
//!
//! ```bash
//! plotline query "SELECT t, count() AS hits FROM requests WHERE ts >= $from GROUP BY t ORDER BY t"
//! plotline query "SELECT ..." --range 24h --format json
//! plotline query "SELECT ..." --range 1482849300000,1482849720000
//! ```
//!
//! # Configuration
//!
//! Connection details come from the `[clickhouse]` section, conversion
//! options from `[convert]`. `--url` and `--database` override the file.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use plotline_query::{
    ClickHouseBackend, ClickHouseConfig, CollisionPolicy, ColumnClassification, OutputFormat,
    TimeRange, TimeSeriesEngine,
};

use crate::cmd::convert::resolve_options;
use crate::cmd::output::write_result;
use crate::config::Config;

/// Query command arguments
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// SQL query to execute (SELECT only). `$from`, `$to`, `$fromMs`, `$toMs` are expanded.
    #[arg(value_name = "SQL")]
    sql: String,

    /// Time range (e.g. 15m, 1h, 7d, today, or start,end)
    #[arg(short, long, default_value = "1h")]
    range: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// ClickHouse HTTP URL. Overrides config.
    #[arg(long, env = "PLOTLINE_CLICKHOUSE_URL")]
    url: Option<String>,

    /// Database name. Overrides config.
    #[arg(long)]
    database: Option<String>,

    /// Column classification (declared_type, first_non_null). Overrides config.
    #[arg(long)]
    classify: Option<ColumnClassification>,

    /// Series name collisions (overwrite, reject). Overrides config.
    #[arg(long)]
    collisions: Option<CollisionPolicy>,
}

/// Run the query command
pub async fn run(args: QueryArgs, config: &Config) -> Result<()> {
    let format: OutputFormat = args
        .format
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid format: {}", e))?;

    let range = TimeRange::parse(&args.range).context("invalid --range")?;
    let ch_config = resolve_clickhouse(&config.clickhouse, args.url, args.database);
    let options = resolve_options(&config.convert, args.classify, args.collisions);

    tracing::debug!(
        url = %ch_config.url,
        database = %ch_config.database,
        from_ms = range.from_ms(),
        to_ms = range.to_ms(),
        "running query"
    );

    let engine = TimeSeriesEngine::new(ClickHouseBackend::new(&ch_config)).with_options(options);

    let start = Instant::now();
    let result = engine
        .query(&args.sql, &range)
        .await
        .context("query failed")?;
    let elapsed_ms = start.elapsed().as_millis();

    write_result(&mut std::io::stdout().lock(), &result, format)?;

    eprintln!(
        "\n{} series in {}ms [{}]",
        result.len(),
        elapsed_ms,
        engine.backend_name()
    );

    Ok(())
}

/// CLI flags take precedence over the config file
fn resolve_clickhouse(
    base: &ClickHouseConfig,
    url: Option<String>,
    database: Option<String>,
) -> ClickHouseConfig {
    let mut config = base.clone();
    if let Some(url) = url {
        config.url = url;
    }
    if let Some(database) = database {
        config.database = database;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_clickhouse_overrides() {
        let base = ClickHouseConfig::new("http://ch:8123", "metrics").with_credentials("r", "p");

        let config = resolve_clickhouse(&base, Some("http://other:8123".into()), None);
        assert_eq!(config.url, "http://other:8123");
        assert_eq!(config.database, "metrics");
        assert_eq!(config.username.as_deref(), Some("r"));

        let config = resolve_clickhouse(&base, None, Some("logs".into()));
        assert_eq!(config.url, "http://ch:8123");
        assert_eq!(config.database, "logs");
    }
}
