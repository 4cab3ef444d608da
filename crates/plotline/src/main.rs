//! Plotline - ClickHouse query results as dashboard time series
//!
//! # Usage
//!
//! ```bash
//! # Convert a saved FORMAT JSON response
//! plotline convert response.json
//!
//! # Run a query over the last 6 hours
//! plotline query "SELECT t, groupArray((os, c)) AS groupArr FROM ... " --range 6h
//! ```

mod cmd;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Plotline - ClickHouse query results as dashboard time series
#[derive(Parser, Debug)]
#[command(name = "plotline")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a saved ClickHouse JSON response into series
    Convert(cmd::convert::ConvertArgs),

    /// Run a query against ClickHouse and print the series
    Query(cmd::query::QueryArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level)?;

    match cli.command {
        Command::Convert(args) => cmd::convert::run(args, &config),
        Command::Query(args) => cmd::query::run(args, &config).await,
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so series output on stdout stays pipeable.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();

    Ok(())
}
