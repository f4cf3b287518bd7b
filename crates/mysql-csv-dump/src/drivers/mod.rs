//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB via sqlx
//!
//! A driver implements [`QuerySource`](crate::core::QuerySource) and
//! [`RowCursor`](crate::core::RowCursor); nothing above this layer knows
//! which database it talks to.

pub mod mysql;

pub use mysql::{MysqlConnection, MysqlCursor, MysqlTransaction};
