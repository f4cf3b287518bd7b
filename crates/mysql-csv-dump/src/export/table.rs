//! Single-table export: query, materialize, encode, write.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{select_all, QuerySource};
use crate::csv::{Dialect, DialectWriter};
use crate::error::{DumpError, Result};

use super::materialize::TextFormat;
use super::sink::{output_path, OutputSink};

/// Log progress every this many rows.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Settings shared by every table of a batch.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving one file per table.
    pub output_dir: PathBuf,
    /// Gzip each output file.
    pub compress: bool,
    /// Omit the column-name record.
    pub skip_header: bool,
    /// Delimiting, quoting and escaping rules.
    pub dialect: Dialect,
    /// Per-kind text rendering.
    pub format: TextFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            compress: false,
            skip_header: false,
            dialect: Dialect::default(),
            format: TextFormat::default(),
        }
    }
}

/// Outcome of one successful table export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    /// Table name.
    pub table: String,
    /// File written.
    pub path: PathBuf,
    /// Data rows written (header excluded).
    pub rows: u64,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

/// Exports one table at a time into its own file.
#[derive(Debug, Clone)]
pub struct TableExporter {
    options: ExportOptions,
}

impl TableExporter {
    /// Create an exporter.
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Directory receiving the output files.
    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// Export `table` into `{output_dir}/{table}.csv[.gz]`.
    ///
    /// The file is created before the query runs, so a failing query leaves
    /// an empty file behind. Rows written before a failure stay on disk.
    pub async fn export_table<S>(&self, source: &mut S, table: &str) -> Result<TableSummary>
    where
        S: QuerySource + ?Sized,
    {
        let start = Instant::now();
        let sql = select_all(table)?;
        let path = output_path(&self.options.output_dir, table, self.options.compress);

        let sink = OutputSink::create(&path, self.options.compress)?;
        debug!(
            "Writing {} to {:?} (compressed: {})",
            table,
            path,
            sink.is_compressed()
        );

        let (rows, sink) = self.write_rows(source, table, &sql, sink).await?;
        sink.finish()?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Exported {} rows from {} in {}ms", rows, table, duration_ms);

        Ok(TableSummary {
            table: table.to_string(),
            path,
            rows,
            duration_ms,
        })
    }

    /// Stream the result of `SELECT * FROM table` into `out`.
    ///
    /// Returns the number of data rows and the flushed writer.
    pub async fn write_table<S, W>(&self, source: &mut S, table: &str, out: W) -> Result<(u64, W)>
    where
        S: QuerySource + ?Sized,
        W: Write,
    {
        let sql = select_all(table)?;
        self.write_rows(source, table, &sql, out).await
    }

    async fn write_rows<S, W>(
        &self,
        source: &mut S,
        table: &str,
        sql: &str,
        out: W,
    ) -> Result<(u64, W)>
    where
        S: QuerySource + ?Sized,
        W: Write,
    {
        let mut writer = DialectWriter::new(out, self.options.dialect.clone());
        let mut cursor = source.query(sql, &[]).await?;

        let columns: Vec<String> = match cursor.columns() {
            Some(columns) => columns.to_vec(),
            None => {
                return Err(DumpError::Schema {
                    table: table.to_string(),
                })
            }
        };

        if !self.options.skip_header {
            writer.write_record(&columns)?;
        }

        let mut rows: u64 = 0;
        while let Some(row) = cursor.next_row().await? {
            let fields = self.options.format.materialize(&columns, &row)?;
            writer.write_record(&fields)?;
            rows += 1;
            if rows % PROGRESS_INTERVAL == 0 {
                debug!("{}: {} rows written", table, rows);
            }
        }
        drop(cursor);

        let out = writer.finish()?;
        Ok((rows, out))
    }
}
