//! The row-streaming export engine.
//!
//! - [`materialize`]: typed values to display strings
//! - [`sink`]: output file creation and gzip wrapping
//! - [`table`]: one table from query to finished file
//! - [`batch`]: many tables with per-table failure isolation
//! - [`discovery`]: `SHOW TABLES`

pub mod batch;
pub mod discovery;
pub mod materialize;
pub mod sink;
pub mod table;

pub use batch::{ensure_output_dir, export_batch, BatchReport, TableFailure};
pub use discovery::list_tables;
pub use materialize::{BinaryFormat, TextFormat};
pub use sink::{output_path, OutputSink};
pub use table::{ExportOptions, TableExporter, TableSummary};
