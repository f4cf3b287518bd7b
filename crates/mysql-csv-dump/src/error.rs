//! Error types for the dump library.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for configuration and validation errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for database connection or query errors.
pub const EXIT_DATABASE_ERROR: u8 = 3;
/// Exit code when a table's column list cannot be determined.
pub const EXIT_SCHEMA_ERROR: u8 = 4;
/// Exit code when one or more tables failed to export.
pub const EXIT_TABLES_FAILED: u8 = 5;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for dump operations.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Configuration error (invalid YAML, bad dialect characters, missing fields)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table name rejected before it reached the query text
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// MySQL connection, query or decode error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query failure reported by a non-sqlx query source
    #[error("Query failed: {0}")]
    Query(String),

    /// The result set of a table exposes no column list
    #[error("Cannot determine columns for table {table}")]
    Schema { table: String },

    /// A fetched row does not line up with the column list
    #[error("Row has {actual} values but the result has {expected} columns")]
    RowShape { expected: usize, actual: usize },

    /// Output directory is missing and cannot be created
    #[error("Output directory {path:?} is unusable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some tables failed while the rest of the batch completed
    #[error("{failed} of {total} tables failed to export")]
    TablesFailed { failed: usize, total: usize },

    /// IO error (file creation, writes, compression)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DumpError {
    /// Create a Query error from any displayable message.
    pub fn query(message: impl Into<String>) -> Self {
        DumpError::Query(message.into())
    }

    /// Errors that end the whole run instead of just the current table.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, DumpError::Schema { .. } | DumpError::OutputDir { .. })
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            DumpError::Config(_)
            | DumpError::InvalidIdentifier(_)
            | DumpError::Yaml(_)
            | DumpError::Json(_) => EXIT_CONFIG_ERROR,
            DumpError::Database(_) | DumpError::Query(_) | DumpError::RowShape { .. } => {
                EXIT_DATABASE_ERROR
            }
            DumpError::Schema { .. } => EXIT_SCHEMA_ERROR,
            DumpError::TablesFailed { .. } => EXIT_TABLES_FAILED,
            DumpError::OutputDir { .. } | DumpError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dump operations.
pub type Result<T> = std::result::Result<T, DumpError>;
