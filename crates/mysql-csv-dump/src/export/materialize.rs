//! Row materialization: typed column values to display strings.
//!
//! Each [`SqlValue`] kind has a fixed textual form:
//!
//! | kind      | text                                         |
//! |-----------|----------------------------------------------|
//! | NULL      | [`TextFormat::null_value`] (empty by default) |
//! | bool      | `1` / `0`                                    |
//! | integers  | decimal digits                               |
//! | floats    | shortest round-trip representation           |
//! | decimal   | server text, unchanged                       |
//! | text      | unchanged                                    |
//! | bytes     | per [`BinaryFormat`]                         |
//! | date      | `YYYY-MM-DD`                                 |
//! | time      | `HH:MM:SS`, plus a fraction when non-zero    |
//! | datetime  | `YYYY-MM-DD HH:MM:SS`, same fraction rule    |

use std::borrow::Cow;
use std::fmt::Write as _;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::core::SqlValue;
use crate::error::{DumpError, Result};

/// How binary column values are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryFormat {
    /// Lowercase hexadecimal, two digits per byte.
    #[default]
    Hex,
    /// Standard base64 with padding.
    Base64,
    /// Lossy UTF-8: invalid sequences become U+FFFD.
    Utf8,
}

impl FromStr for BinaryFormat {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hex" => Ok(BinaryFormat::Hex),
            "base64" => Ok(BinaryFormat::Base64),
            "utf8" | "utf-8" => Ok(BinaryFormat::Utf8),
            other => Err(DumpError::Config(format!(
                "binary format must be hex, base64 or utf8, got '{}'",
                other
            ))),
        }
    }
}

/// Text rendering policy applied to every column value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextFormat {
    /// Literal written for SQL NULL.
    pub null_value: String,
    /// Rendering of binary columns.
    pub binary: BinaryFormat,
}

impl TextFormat {
    /// Render one value.
    pub fn format_value<'v>(&self, value: &'v SqlValue<'_>) -> Cow<'v, str> {
        match value {
            SqlValue::Null => Cow::Owned(self.null_value.clone()),
            SqlValue::Bool(v) => Cow::Borrowed(if *v { "1" } else { "0" }),
            SqlValue::I64(v) => Cow::Owned(v.to_string()),
            SqlValue::U64(v) => Cow::Owned(v.to_string()),
            SqlValue::F32(v) => Cow::Owned(v.to_string()),
            SqlValue::F64(v) => Cow::Owned(v.to_string()),
            SqlValue::Decimal(v) | SqlValue::Text(v) => Cow::Borrowed(v.as_ref()),
            SqlValue::Bytes(v) => self.format_bytes(v),
            SqlValue::Date(v) => Cow::Owned(v.format("%Y-%m-%d").to_string()),
            SqlValue::Time(v) => Cow::Owned(v.format("%H:%M:%S%.f").to_string()),
            SqlValue::DateTime(v) => Cow::Owned(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        }
    }

    fn format_bytes<'v>(&self, bytes: &'v [u8]) -> Cow<'v, str> {
        match self.binary {
            BinaryFormat::Hex => {
                let mut out = String::with_capacity(bytes.len() * 2);
                for b in bytes {
                    let _ = write!(out, "{:02x}", b);
                }
                Cow::Owned(out)
            }
            BinaryFormat::Base64 => Cow::Owned(BASE64_STANDARD.encode(bytes)),
            BinaryFormat::Utf8 => String::from_utf8_lossy(bytes),
        }
    }

    /// Render a row, one string per column, aligned with `columns`.
    ///
    /// # Errors
    ///
    /// `DumpError::RowShape` when the row and column counts differ.
    pub fn materialize<'v>(
        &self,
        columns: &[String],
        row: &'v [SqlValue<'_>],
    ) -> Result<Vec<Cow<'v, str>>> {
        if row.len() != columns.len() {
            return Err(DumpError::RowShape {
                expected: columns.len(),
                actual: row.len(),
            });
        }
        Ok(row.iter().map(|v| self.format_value(v)).collect())
    }
}
