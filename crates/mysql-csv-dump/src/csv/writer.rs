//! Buffered record writer over any `io::Write` sink.

use std::io::{self, BufWriter, Write};

use super::dialect::Dialect;

/// Output buffer size for the record writer.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Writes dialect-encoded records to an underlying sink.
///
/// Records are staged in a reusable line buffer and then handed to a
/// `BufWriter`. Errors from buffered writes may only show up at
/// [`DialectWriter::finish`], which must be called to observe them.
pub struct DialectWriter<W: Write> {
    dialect: Dialect,
    inner: BufWriter<W>,
    line: String,
    records: u64,
}

impl<W: Write> DialectWriter<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W, dialect: Dialect) -> Self {
        Self {
            dialect,
            inner: BufWriter::with_capacity(WRITE_BUFFER_SIZE, inner),
            line: String::new(),
            records: 0,
        }
    }

    /// Encode and write one record.
    pub fn write_record<I, S>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.line.clear();
        self.dialect.encode_record(fields, &mut self.line);
        self.inner.write_all(self.line.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flush buffered output and return the sink.
    ///
    /// Surfaces any write error deferred by buffering.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}
