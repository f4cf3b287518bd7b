//! Core abstractions shared by the exporter and the database drivers.
//!
//! - [`value`]: typed column values produced by a cursor
//! - [`traits`]: the [`QuerySource`] / [`RowCursor`] capability pair
//! - [`identifier`]: table name validation and quoting

pub mod identifier;
pub mod traits;
pub mod value;

pub use identifier::{quote_mysql, select_all, validate_table_name};
pub use traits::{QuerySource, RowCursor};
pub use value::SqlValue;
