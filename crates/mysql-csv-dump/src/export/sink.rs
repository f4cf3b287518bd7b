//! Output file creation, optionally gzip-compressed.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Extension of uncompressed output files.
pub const CSV_EXTENSION: &str = "csv";
/// Extension appended when compressing.
pub const GZIP_EXTENSION: &str = "gz";

/// Build `{dir}/{table}.csv`, or `{dir}/{table}.csv.gz` when compressing.
pub fn output_path(dir: &Path, table: &str, compress: bool) -> PathBuf {
    let mut name = format!("{}.{}", table, CSV_EXTENSION);
    if compress {
        name.push('.');
        name.push_str(GZIP_EXTENSION);
    }
    dir.join(name)
}

/// A freshly created output file, owned by one table export.
///
/// Dropping the sink closes the file on every path; [`OutputSink::finish`]
/// is the only way to observe errors from the final flush and the gzip
/// trailer.
pub enum OutputSink {
    /// Plain text file.
    Plain(File),
    /// Gzip stream over a buffered file.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputSink {
    /// Create (truncating) `path`, wrapping it in gzip when `compress` is set.
    pub fn create(path: &Path, compress: bool) -> io::Result<Self> {
        let file = File::create(path)?;
        if compress {
            Ok(OutputSink::Gzip(GzEncoder::new(
                BufWriter::new(file),
                Compression::default(),
            )))
        } else {
            Ok(OutputSink::Plain(file))
        }
    }

    /// Whether output is gzip-compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self, OutputSink::Gzip(_))
    }

    /// Finalize the stream and close the file.
    ///
    /// For gzip output the encoder is finished (trailer written) before the
    /// file buffer is flushed and the file closed.
    pub fn finish(self) -> io::Result<()> {
        match self {
            OutputSink::Plain(mut file) => file.flush(),
            OutputSink::Gzip(encoder) => {
                let mut buffered = encoder.finish()?;
                buffered.flush()?;
                let file = buffered.into_inner().map_err(|e| e.into_error())?;
                drop(file);
                Ok(())
            }
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Plain(file) => file.write(buf),
            OutputSink::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Plain(file) => file.flush(),
            OutputSink::Gzip(encoder) => encoder.flush(),
        }
    }
}
