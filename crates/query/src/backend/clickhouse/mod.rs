//! ClickHouse backend
//!
//! Runs queries over the ClickHouse HTTP interface and returns the raw
//! `FORMAT JSON` body.

use std::time::Instant;

use async_trait::async_trait;

use crate::backend::QueryBackend;
use crate::config::ClickHouseConfig;
use crate::error::QueryError;

/// ClickHouse backend using the HTTP interface
#[derive(Clone)]
pub struct ClickHouseBackend {
    client: reqwest::Client,
    config: ClickHouseConfig,
}

impl std::fmt::Debug for ClickHouseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseBackend")
            .field("url", &self.config.url)
            .field("database", &self.config.database)
            .finish()
    }
}

impl ClickHouseBackend {
    /// Create a new ClickHouse backend from config
    pub fn new(config: &ClickHouseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Create from URL and database directly
    pub fn from_url(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self::new(&ClickHouseConfig::new(url, database))
    }

    /// Query string parameters for a request
    fn query_params(&self, sql: &str) -> Vec<(&'static str, String)> {
        vec![
            ("database", self.config.database.clone()),
            (
                "max_execution_time",
                self.config.max_execution_time.to_string(),
            ),
            ("query", sql.to_string()),
        ]
    }

    /// Base endpoint with a trailing slash
    fn endpoint(&self) -> String {
        format!("{}/", self.config.normalized_url().trim_end_matches('/'))
    }

    async fn execute_query(&self, sql: &str) -> Result<Vec<u8>, QueryError> {
        let mut request = self
            .client
            .get(self.endpoint())
            .query(&self.query_params(sql));

        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(|e| {
            QueryError::Connection(format!("ClickHouse connection failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Execution(format!(
                "ClickHouse error ({}): {}",
                status,
                body.trim()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| QueryError::Execution(format!("failed to read response: {}", e)))?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl QueryBackend for ClickHouseBackend {
    async fn fetch(&self, sql: &str) -> Result<Vec<u8>, QueryError> {
        let start = Instant::now();
        let body = self.execute_query(sql).await?;

        tracing::debug!(
            bytes = body.len(),
            time_ms = start.elapsed().as_millis() as u64,
            database = %self.config.database,
            "ClickHouse query executed"
        );

        Ok(body)
    }

    async fn health_check(&self) -> Result<(), QueryError> {
        self.execute_query("SELECT 1").await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "clickhouse"
    }
}
