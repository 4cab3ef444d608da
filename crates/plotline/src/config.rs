//! CLI configuration
//!
//! TOML with every section optional:
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [clickhouse]
//! url = "http://localhost:8123"
//! database = "metrics"
//! username = "reader"
//! password = "secret"
//!
//! [convert]
//! classify = "first_non_null"
//! collisions = "reject"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use plotline_query::{ClickHouseConfig, ConvertOptions};
use serde::Deserialize;

/// Default config locations, tried in order when `--config` is not given
const DEFAULT_PATHS: [&str; 2] = ["configs/plotline.toml", "plotline.toml"];

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: LogLevel,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// ClickHouse connection
    pub clickhouse: ClickHouseConfig,

    /// Response conversion options
    pub convert: ConvertOptions,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        contents
            .parse()
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load from an explicit path, a default location, or fall back to defaults
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match resolve_path(path)? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = path {
        if p.exists() {
            return Ok(Some(p.to_path_buf()));
        }
        return Err(anyhow::anyhow!("config file not found: {}", p.display()));
    }

    Ok(DEFAULT_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists()))
}
