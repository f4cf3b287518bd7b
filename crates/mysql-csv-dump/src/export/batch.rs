//! Batch driver: export a list of tables, isolating per-table failures.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::QuerySource;
use crate::error::{DumpError, Result};

use super::table::{TableExporter, TableSummary};

/// A table whose export failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableFailure {
    /// Table name.
    pub table: String,
    /// Rendered error message.
    pub error: String,
}

/// Per-table outcomes of one batch, in request order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Tables written completely.
    pub exported: Vec<TableSummary>,
    /// Tables that failed; their files may be partial or empty.
    pub failed: Vec<TableFailure>,
}

impl BatchReport {
    /// Number of tables attempted.
    pub fn tables_total(&self) -> usize {
        self.exported.len() + self.failed.len()
    }

    /// Data rows written across all successful tables.
    pub fn rows_exported(&self) -> u64 {
        self.exported.iter().map(|t| t.rows).sum()
    }

    /// Whether every table was exported.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Make sure `dir` exists and is a directory, creating it if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    let to_err = |source: std::io::Error| DumpError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(to_err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "path exists and is not a directory",
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(dir).map_err(to_err)?;
            info!("Created output directory {:?}", dir);
            Ok(())
        }
        Err(e) => Err(to_err(e)),
    }
}

/// Export `tables` in order through `source`.
///
/// A table failure is logged as `Error dumping <table>: <message>` and
/// recorded in the report; the remaining tables still run. Only fatal errors
/// (see [`DumpError::is_fatal`]) abort the batch.
pub async fn export_batch<S>(
    exporter: &TableExporter,
    source: &mut S,
    tables: &[String],
) -> Result<BatchReport>
where
    S: QuerySource + ?Sized,
{
    ensure_output_dir(exporter.output_dir())?;

    info!(
        "Exporting {} tables via {} to {:?}",
        tables.len(),
        source.kind(),
        exporter.output_dir()
    );

    let mut report = BatchReport::default();
    for table in tables {
        match exporter.export_table(source, table).await {
            Ok(summary) => report.exported.push(summary),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("Error dumping {}: {}", table, e);
                report.failed.push(TableFailure {
                    table: table.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Batch finished: {}/{} tables, {} rows",
        report.exported.len(),
        report.tables_total(),
        report.rows_exported()
    );

    Ok(report)
}
