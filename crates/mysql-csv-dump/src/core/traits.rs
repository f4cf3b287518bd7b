//! Core traits for reading rows out of a database.
//!
//! - [`QuerySource`]: anything that can run a query and hand back a cursor
//! - [`RowCursor`]: a streaming handle over one result set
//!
//! Both a plain connection and an open transaction implement [`QuerySource`],
//! so the exporter never needs to know whether it runs inside a snapshot.

use async_trait::async_trait;

use crate::error::Result;

use super::value::SqlValue;

/// Execute queries and stream their results.
#[async_trait]
pub trait QuerySource: Send {
    /// Run `sql` with optional bound parameters and return a cursor.
    ///
    /// The cursor borrows the source, so only one result set is open at a
    /// time.
    async fn query<'s>(
        &'s mut self,
        sql: &'s str,
        params: &'s [SqlValue<'static>],
    ) -> Result<Box<dyn RowCursor + 's>>;

    /// Short label for logs ("connection", "transaction", ...).
    fn kind(&self) -> &'static str;
}

/// Streaming access to one result set, one row at a time.
#[async_trait]
pub trait RowCursor: Send {
    /// Column names of the result set, in order.
    ///
    /// `None` when the driver could not describe the result.
    fn columns(&self) -> Option<&[String]>;

    /// Fetch and decode the next row, or `None` once the cursor is drained.
    async fn next_row(&mut self) -> Result<Option<Vec<SqlValue<'static>>>>;
}
