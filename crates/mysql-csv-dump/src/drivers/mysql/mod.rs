//! MySQL/MariaDB driver.
//!
//! - [`MysqlConnection`]: query source over a pooled connection
//! - [`MysqlTransaction`]: query source over one open transaction
//! - [`MysqlCursor`]: streaming result set, decoded into [`SqlValue`](crate::core::SqlValue)
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod cursor;
mod source;

pub use cursor::MysqlCursor;
pub use source::{connect, parse_ssl_mode, MysqlConnection, MysqlTransaction};
