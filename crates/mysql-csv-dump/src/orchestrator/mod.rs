//! Dump orchestrator: connect, open the session, discover, export, roll back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::core::QuerySource;
use crate::drivers::mysql::{connect, MysqlConnection, MysqlTransaction};
use crate::error::{DumpError, Result};
use crate::export::{export_batch, list_tables, BatchReport, TableExporter, TableFailure, TableSummary};

/// Runs one export batch from a validated configuration.
pub struct Dumper {
    config: Config,
    exporter: TableExporter,
}

/// Result of a dump run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed" or "failed".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the dump started.
    pub started_at: DateTime<Utc>,

    /// When the dump completed.
    pub completed_at: DateTime<Utc>,

    /// Tables attempted.
    pub tables_total: usize,

    /// Tables written completely.
    pub tables_success: usize,

    /// Tables that failed.
    pub tables_failed: usize,

    /// Data rows written across successful tables.
    pub rows_exported: u64,

    /// Average throughput (rows/second).
    pub rows_per_second: u64,

    /// Per-table outcome of every exported table.
    pub tables: Vec<TableSummary>,

    /// Tables that failed, with their error.
    pub failed_tables: Vec<TableFailure>,
}

impl DumpResult {
    /// Summarize a finished batch.
    pub fn from_report(
        run_id: String,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        report: BatchReport,
    ) -> Self {
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let rows_exported = report.rows_exported();
        let rows_per_second = if duration_seconds > 0.0 {
            (rows_exported as f64 / duration_seconds) as u64
        } else {
            0
        };
        let status = if report.is_complete() { "completed" } else { "failed" };

        Self {
            run_id,
            status: status.to_string(),
            duration_seconds,
            started_at,
            completed_at,
            tables_total: report.tables_total(),
            tables_success: report.exported.len(),
            tables_failed: report.failed.len(),
            rows_exported,
            rows_per_second,
            tables: report.exported,
            failed_tables: report.failed,
        }
    }

    /// `DumpError::TablesFailed` when any table failed.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.tables_failed > 0 {
            return Err(DumpError::TablesFailed {
                failed: self.tables_failed,
                total: self.tables_total,
            });
        }
        Ok(())
    }

    /// Serialize the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Dumper {
    /// Validate `config` and prepare the exporter.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let exporter = TableExporter::new(config.export_options()?);
        Ok(Self { config, exporter })
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connect, export, and always release the session.
    ///
    /// With `single_transaction` every query, discovery included, runs inside
    /// one transaction that is rolled back afterwards. Nothing is committed.
    pub async fn run(&self) -> Result<DumpResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting dump run: {}", run_id);

        let pool = connect(&self.config.source).await?;

        let outcome = if self.config.export.single_transaction {
            let mut tx = MysqlTransaction::begin(&pool).await?;
            let outcome = self.run_with_source(&mut tx).await;
            if let Err(e) = tx.rollback().await {
                warn!("Rollback failed: {}", e);
            }
            outcome
        } else {
            let mut conn = MysqlConnection::acquire(&pool).await?;
            let outcome = self.run_with_source(&mut conn).await;
            drop(conn);
            outcome
        };

        pool.close().await;
        let report = outcome?;

        let result = DumpResult::from_report(run_id, started_at, Utc::now(), report);
        info!(
            "Dump {}: {}/{} tables, {} rows in {:.1}s ({} rows/s)",
            result.status,
            result.tables_success,
            result.tables_total,
            result.rows_exported,
            result.duration_seconds,
            result.rows_per_second
        );

        Ok(result)
    }

    /// Discover tables if none were configured, then export them through
    /// `source`.
    pub async fn run_with_source<S>(&self, source: &mut S) -> Result<BatchReport>
    where
        S: QuerySource + ?Sized,
    {
        let tables = if self.config.export.tables.is_empty() {
            list_tables(source).await?
        } else {
            self.config.export.tables.clone()
        };

        if tables.is_empty() {
            warn!("No tables found in {}", self.config.source.database);
        }

        export_batch(&self.exporter, source, &tables).await
    }
}
