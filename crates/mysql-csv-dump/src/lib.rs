//! # mysql-csv-dump
//!
//! Export MySQL/MariaDB tables into delimited text files, one file per table.
//!
//! This library provides:
//!
//! - **Streaming export**: rows go from the query cursor to disk one at a time
//! - **Configurable dialect**: delimiter, optional quote, escape and terminator
//! - **Gzip output** per table file
//! - **Snapshot consistency** by running every table inside one transaction
//! - **Per-table isolation**: a failing table is reported, the rest still run
//!
//! ## Example
//!
//! ```rust,no_run
//! use mysql_csv_dump::{Config, Dumper};
//!
//! #[tokio::main]
//! async fn main() -> mysql_csv_dump::Result<()> {
//!     let config = Config::load("dump.yaml")?;
//!     let dumper = Dumper::new(config)?;
//!     let result = dumper.run().await?;
//!     println!("Exported {} rows", result.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod csv;
pub mod drivers;
pub mod error;
pub mod export;
pub mod orchestrator;

// Re-exports for convenient access
pub use crate::config::{Config, ExportConfig, SourceConfig};
pub use crate::core::{QuerySource, RowCursor, SqlValue};
pub use crate::csv::{Dialect, DialectWriter};
pub use crate::error::{DumpError, Result};
pub use crate::export::{
    export_batch, list_tables, BatchReport, BinaryFormat, ExportOptions, TableExporter,
    TableFailure, TableSummary, TextFormat,
};
pub use crate::orchestrator::{DumpResult, Dumper};
