//! Table name validation and quoting.
//!
//! MySQL cannot bind identifiers as statement parameters, so every table name
//! is spliced into the `SELECT` text. The same name also becomes the output
//! file name. Both uses are guarded here:
//!
//! 1. Characters that could escape the output directory or break the file
//!    name are rejected: `/`, `\`, `.`, NUL and other control characters.
//!    Anything MySQL accepts inside backticks (spaces, `-`, non-ASCII) passes.
//! 2. The name is wrapped in backticks with embedded backticks doubled.

use crate::error::{DumpError, Result};

/// MySQL's identifier length limit, in characters.
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

fn is_rejected_char(c: char) -> bool {
    matches!(c, '/' | '\\' | '.') || c.is_control()
}

/// Validate a table name for use in query text and as a file name.
///
/// # Errors
///
/// Returns `DumpError::InvalidIdentifier` for empty, over-long or
/// path-like names.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DumpError::InvalidIdentifier(
            "table name cannot be empty".to_string(),
        ));
    }

    let len = name.chars().count();
    if len > MAX_IDENTIFIER_LENGTH {
        return Err(DumpError::InvalidIdentifier(format!(
            "table name exceeds {} characters (got {}): {:?}",
            MAX_IDENTIFIER_LENGTH, len, name
        )));
    }

    if let Some(bad) = name.chars().find(|c| is_rejected_char(*c)) {
        return Err(DumpError::InvalidIdentifier(format!(
            "table name {:?} contains disallowed character {:?}",
            name, bad
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// Validates the identifier first.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("odd`name")?, "`odd``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_table_name(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Build the full-table query for an already validated name.
pub fn select_all(name: &str) -> Result<String> {
    Ok(format!("SELECT * FROM {}", quote_mysql(name)?))
}
