//! `tracing` instrumentation for any [`GenericClient`].
//!
//! [`TracedClient`] emits one event per statement under the `catalog.sql`
//! target: the (truncated) SQL, parameter count, elapsed time and row count.
//! Statements slower than the configured threshold are reported at WARN.

use crate::client::GenericClient;
use crate::error::StoreResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Settings for [`TracedClient`].
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements at or above this duration are logged at WARN.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs every statement it runs.
///
/// # Example
/// ```ignore
/// let client = TracedClient::new(pool.get().await?)
///     .with_config(TraceConfig::new().with_slow_query_threshold(Duration::from_millis(50)));
/// let source = PgSource::new(&client);
/// ```
#[derive(Debug)]
pub struct TracedClient<C> {
    inner: C,
    config: TraceConfig,
}

impl<C: GenericClient> TracedClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            config: TraceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Get the wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn emit(
        &self,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        outcome: Result<usize, &str>,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    _ => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.config.display_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let slow = self
            .config
            .slow_query_threshold
            .is_some_and(|threshold| elapsed >= threshold);

        match outcome {
            Err(error) => tracing::error!(
                target: "catalog.sql",
                param_count,
                elapsed_ms,
                sql = %sql,
                error,
                "query failed"
            ),
            Ok(rows) if slow => tracing::warn!(
                target: "catalog.sql",
                param_count,
                elapsed_ms,
                rows,
                sql = %sql,
                "slow query"
            ),
            Ok(rows) => emit_at_level!(
                self.config.level,
                target: "catalog.sql",
                param_count,
                elapsed_ms,
                rows,
                sql = %sql,
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.inner.query(sql, params).await;
        let elapsed = start.elapsed();
        match &result {
            Ok(rows) => self.emit(sql, params.len(), elapsed, Ok(rows.len())),
            Err(e) => self.emit(sql, params.len(), elapsed, Err(&e.to_string())),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting in the middle backs off to the boundary.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[test]
    fn display_sql_appends_ellipsis_only_when_cut() {
        let config = TraceConfig::new().max_sql_length(6);
        assert_eq!(config.display_sql("SELECT 1"), "SELECT...");
        assert_eq!(config.display_sql("SELECT"), "SELECT");
        assert_eq!(TraceConfig::new().no_truncate().display_sql("SELECT 1"), "SELECT 1");
    }
}
