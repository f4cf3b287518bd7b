//! Table discovery through the active query source.

use tracing::debug;

use crate::core::{QuerySource, SqlValue};
use crate::error::{DumpError, Result};

/// Statement listing the tables of the current database.
pub const SHOW_TABLES: &str = "SHOW TABLES";

/// List every table of the current database, in server order.
///
/// Runs through `source`, so inside a transaction the list belongs to the
/// same snapshot as the exported rows.
pub async fn list_tables<S>(source: &mut S) -> Result<Vec<String>>
where
    S: QuerySource + ?Sized,
{
    let mut cursor = source.query(SHOW_TABLES, &[]).await?;
    let mut tables = Vec::new();

    while let Some(row) = cursor.next_row().await? {
        let name = match row.into_iter().next() {
            Some(SqlValue::Text(name)) => name.into_owned(),
            Some(SqlValue::Bytes(raw)) => String::from_utf8(raw.into_owned()).map_err(|e| {
                DumpError::query(format!("table name is not valid UTF-8: {}", e))
            })?,
            Some(other) => {
                return Err(DumpError::query(format!(
                    "unexpected {} value in {} result",
                    other.kind(),
                    SHOW_TABLES
                )))
            }
            None => return Err(DumpError::query(format!("empty row in {} result", SHOW_TABLES))),
        };
        tables.push(name);
    }

    debug!("Discovered {} tables", tables.len());
    Ok(tables)
}
