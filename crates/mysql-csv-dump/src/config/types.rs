//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::csv::dialect::{DEFAULT_DELIMITER, DEFAULT_ESCAPE, DEFAULT_QUOTE, DEFAULT_TERMINATOR};
use crate::export::BinaryFormat;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source database connection.
    #[serde(default)]
    pub source: SourceConfig,

    /// Export behavior.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Source database (MySQL/MariaDB) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database (schema) whose tables are exported.
    #[serde(default)]
    pub database: String,

    /// Username (default: "root").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password. Never written back out.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// TLS mode (default: "preferred").
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_mysql_port(),
            database: String::new(),
            user: default_user(),
            password: String::new(),
            ssl_mode: default_ssl_mode(),
        }
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Export behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving one file per table (default: ".").
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Tables to export. Empty means every table of the database.
    #[serde(default)]
    pub tables: Vec<String>,

    /// Gzip each output file (default: false).
    #[serde(default)]
    pub compress: bool,

    /// Export all tables inside one transaction (default: true).
    #[serde(default = "default_true")]
    pub single_transaction: bool,

    /// Omit the column-name record (default: false).
    #[serde(default)]
    pub skip_header: bool,

    /// Field delimiter; `\t`, `\n`, `\r` and `\\` are expanded (default: tab).
    #[serde(default = "default_delimiter")]
    pub fields_terminated_by: String,

    /// Quote character for fields that need it (default: `"`).
    #[serde(default = "default_quote")]
    pub fields_enclosed_by: String,

    /// Escape character (default: `\`).
    #[serde(default = "default_escape")]
    pub fields_escaped_by: String,

    /// Record terminator; escapes as for the delimiter (default: newline).
    #[serde(default = "default_terminator")]
    pub lines_terminated_by: String,

    /// Text written for SQL NULL (default: empty).
    #[serde(default)]
    pub null_value: String,

    /// Rendering of binary columns (default: hex).
    #[serde(default)]
    pub binary_format: BinaryFormat,

    /// Exit successfully even when some tables failed (default: false).
    #[serde(default)]
    pub ignore_table_errors: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            tables: Vec::new(),
            compress: false,
            single_transaction: true,
            skip_header: false,
            fields_terminated_by: default_delimiter(),
            fields_enclosed_by: default_quote(),
            fields_escaped_by: default_escape(),
            lines_terminated_by: default_terminator(),
            null_value: String::new(),
            binary_format: BinaryFormat::default(),
            ignore_table_errors: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

fn default_ssl_mode() -> String {
    "preferred".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_quote() -> String {
    DEFAULT_QUOTE.to_string()
}

fn default_escape() -> String {
    DEFAULT_ESCAPE.to_string()
}

fn default_terminator() -> String {
    DEFAULT_TERMINATOR.to_string()
}

fn default_true() -> bool {
    true
}
