//! Delimited-text dialect and record encoding.

use crate::error::{DumpError, Result};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: &str = "\t";
/// Default quote character.
pub const DEFAULT_QUOTE: char = '"';
/// Default escape character.
pub const DEFAULT_ESCAPE: char = '\\';
/// Default record terminator.
pub const DEFAULT_TERMINATOR: &str = "\n";

/// Characters governing delimiting, quoting and escaping of output lines.
///
/// Fields are enclosed only when they need to be, and special characters
/// inside an enclosed field are prefixed with the escape character. Quote
/// doubling is never used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    delimiter: String,
    quote: char,
    escape: char,
    terminator: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            quote: DEFAULT_QUOTE,
            escape: DEFAULT_ESCAPE,
            terminator: DEFAULT_TERMINATOR.to_string(),
        }
    }
}

impl Dialect {
    /// Build a dialect from user-supplied strings.
    ///
    /// `quote` and `escape` must each be exactly one code point; `delimiter`
    /// and `terminator` must be non-empty.
    pub fn new(delimiter: &str, quote: &str, escape: &str, terminator: &str) -> Result<Self> {
        if delimiter.is_empty() {
            return Err(DumpError::Config(
                "field delimiter can't be an empty string".to_string(),
            ));
        }
        if terminator.is_empty() {
            return Err(DumpError::Config(
                "line terminator can't be an empty string".to_string(),
            ));
        }
        let quote = single_char("fields-optionally-enclosed-by", quote)?;
        let escape = single_char("fields-escaped-by", escape)?;

        // A separator holding the quote or escape character cannot be told
        // apart from field content on read.
        for (option, separator) in [
            ("fields-terminated-by", delimiter),
            ("lines-terminated-by", terminator),
        ] {
            if let Some(c) = separator.chars().find(|c| *c == quote || *c == escape) {
                return Err(DumpError::Config(format!(
                    "--{} can't contain the quote or escape character {:?}",
                    option, c
                )));
            }
        }

        Ok(Self {
            delimiter: delimiter.to_string(),
            quote,
            escape,
            terminator: terminator.to_string(),
        })
    }

    /// Field delimiter.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Quote (enclosure) character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Escape character.
    pub fn escape(&self) -> char {
        self.escape
    }

    /// Record terminator.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Whether `field` must be enclosed in quotes.
    pub fn needs_quotes(&self, field: &str) -> bool {
        field.contains(self.delimiter.as_str())
            || field.contains(self.terminator.as_str())
            || field
                .chars()
                .any(|c| c == self.quote || c == self.escape || c == '\n' || c == '\r')
    }

    /// Append one encoded field to `out`.
    pub fn encode_field(&self, field: &str, out: &mut String) {
        if !self.needs_quotes(field) {
            out.push_str(field);
            return;
        }

        out.reserve(field.len() + 2);
        out.push(self.quote);
        for c in field.chars() {
            if c == self.quote || c == self.escape {
                out.push(self.escape);
            }
            out.push(c);
        }
        out.push(self.quote);
    }

    /// Append a full record, including the terminator, to `out`.
    pub fn encode_record<I, S>(&self, fields: I, out: &mut String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                out.push_str(&self.delimiter);
            }
            self.encode_field(field.as_ref(), out);
        }
        out.push_str(&self.terminator);
    }

    /// Encode a record into a fresh string.
    pub fn encode_line<I, S>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        self.encode_record(fields, &mut line);
        line
    }
}

fn single_char(option: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        (None, _) => Err(DumpError::Config(format!(
            "--{} can't be an empty string",
            option
        ))),
        (Some(_), Some(_)) => Err(DumpError::Config(format!(
            "--{} can't be more than one character",
            option
        ))),
    }
}

/// Expand `\t`, `\n`, `\r` and `\\` in a delimiter or terminator argument.
///
/// Any other backslash sequence is kept verbatim.
pub fn unescape_separator(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            _ => {
                out.push('\\');
                continue;
            }
        }
        chars.next();
    }
    out
}
