//! Dialect-aware delimited text encoding.
//!
//! - [`dialect`]: the [`Dialect`] definition and per-record encoding rules
//! - [`writer`]: [`DialectWriter`], a buffered record writer

pub mod dialect;
pub mod writer;

pub use dialect::{unescape_separator, Dialect};
pub use writer::DialectWriter;
