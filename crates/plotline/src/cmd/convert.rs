//! Convert command - turn a saved ClickHouse JSON response into series
//!
//! # Usage
//!
//! ```bash
//! plotline convert response.json
//! clickhouse-client --query "SELECT ... FORMAT JSON" | plotline convert - --format csv
//! plotline convert response.json --classify first_non_null --collisions reject
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use plotline_query::{
    convert_with, decode, CollisionPolicy, ColumnClassification, ConvertOptions, OutputFormat,
};

use crate::cmd::output::write_result;
use crate::config::Config;

/// Convert command arguments
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Response file (`-` for stdin)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Column classification (declared_type, first_non_null). Overrides config.
    #[arg(long)]
    classify: Option<ColumnClassification>,

    /// Series name collisions (overwrite, reject). Overrides config.
    #[arg(long)]
    collisions: Option<CollisionPolicy>,
}

/// Run the convert command
pub fn run(args: ConvertArgs, config: &Config) -> Result<()> {
    let format: OutputFormat = args
        .format
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid format: {}", e))?;

    let options = resolve_options(&config.convert, args.classify, args.collisions);
    let bytes = read_input(&args.input)?;

    let response = decode(&bytes).context("failed to decode response")?;
    let result = convert_with(&response, &options).context("failed to convert response")?;

    write_result(&mut std::io::stdout().lock(), &result, format)?;

    eprintln!(
        "\n{} series from {} row(s) [server: {:.3}s, {} rows read]",
        result.len(),
        response.data.len(),
        response.statistics.elapsed,
        response.statistics.rows_read
    );

    Ok(())
}

/// CLI flags take precedence over the config file
pub fn resolve_options(
    base: &ConvertOptions,
    classify: Option<ColumnClassification>,
    collisions: Option<CollisionPolicy>,
) -> ConvertOptions {
    let mut options = *base;
    if let Some(classify) = classify {
        options = options.with_classification(classify);
    }
    if let Some(collisions) = collisions {
        options = options.with_collisions(collisions);
    }
    options
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_options_flags_win() {
        let base = ConvertOptions::default().with_collisions(CollisionPolicy::Reject);

        let options = resolve_options(&base, Some(ColumnClassification::FirstNonNull), None);
        assert_eq!(options.classify, ColumnClassification::FirstNonNull);
        assert_eq!(options.collisions, CollisionPolicy::Reject);

        let options = resolve_options(&base, None, Some(CollisionPolicy::Overwrite));
        assert_eq!(options.collisions, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_read_input_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"{}").unwrap();

        assert_eq!(read_input(file.path()).unwrap(), b"{}");
    }

    #[test]
    fn test_read_input_missing() {
        assert!(read_input(Path::new("/nonexistent/response.json")).is_err());
    }
}
