//! Configuration validation.

use super::Config;
use crate::drivers::mysql::parse_ssl_mode;
use crate::error::{DumpError, Result};

/// Validate the configuration.
///
/// Runs before any connection is opened. Table names are not checked here:
/// a bad name fails only its own table.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(DumpError::Config("source.host is required".into()));
    }
    if config.source.port == 0 {
        return Err(DumpError::Config("source.port must be non-zero".into()));
    }
    if config.source.database.is_empty() {
        return Err(DumpError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(DumpError::Config("source.user is required".into()));
    }
    parse_ssl_mode(&config.source.ssl_mode)?;

    // Dialect characters
    config.dialect()?;

    Ok(())
}
