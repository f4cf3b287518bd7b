//! In-memory query source for exercising the exporter without a server.

#![allow(dead_code)]

use async_trait::async_trait;
use mysql_csv_dump::{DumpError, QuerySource, Result, RowCursor, SqlValue};

/// Column reported by `SHOW TABLES`.
const SHOW_TABLES_COLUMN: &str = "Tables_in_shop";

/// A table served by [`MemorySource`].
#[derive(Clone, Default)]
pub struct MemoryTable {
    name: String,
    columns: Option<Vec<String>>,
    rows: Vec<Vec<SqlValue<'static>>>,
    query_error: Option<String>,
    fail_after: Option<usize>,
}

impl MemoryTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            ..Default::default()
        }
    }

    /// A table whose result set exposes no column list.
    pub fn without_columns(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn row(mut self, values: Vec<SqlValue<'static>>) -> Self {
        self.rows.push(values);
        self
    }

    /// Make `SELECT` on this table fail before any row.
    pub fn failing_query(mut self, message: &str) -> Self {
        self.query_error = Some(message.to_string());
        self
    }

    /// Make the cursor fail after serving `rows` rows.
    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }
}

/// Serves `SHOW TABLES` and `SELECT * FROM `table`` from memory, recording
/// every statement it receives.
#[derive(Default)]
pub struct MemorySource {
    tables: Vec<MemoryTable>,
    pub statements: Vec<String>,
    discovery_error: Option<String>,
    binary_names: bool,
}

impl MemorySource {
    pub fn new(tables: Vec<MemoryTable>) -> Self {
        Self {
            tables,
            ..Default::default()
        }
    }

    /// Make `SHOW TABLES` fail.
    pub fn failing_discovery(mut self, message: &str) -> Self {
        self.discovery_error = Some(message.to_string());
        self
    }

    /// Report table names from `SHOW TABLES` as bytes, as binary collations do.
    pub fn binary_table_names(mut self) -> Self {
        self.binary_names = true;
        self
    }

    fn show_tables(&self) -> Result<MemoryCursor> {
        if let Some(message) = &self.discovery_error {
            return Err(DumpError::query(message.clone()));
        }
        let binary = self.binary_names;
        Ok(MemoryCursor {
            columns: Some(vec![SHOW_TABLES_COLUMN.to_string()]),
            rows: self
                .tables
                .iter()
                .map(|t| {
                    if binary {
                        vec![SqlValue::bytes_owned(t.name.clone().into_bytes())]
                    } else {
                        vec![SqlValue::text_owned(t.name.clone())]
                    }
                })
                .collect::<Vec<_>>()
                .into_iter(),
            fail_after: None,
            served: 0,
        })
    }

    fn select(&self, sql: &str) -> Result<MemoryCursor> {
        let quoted = sql
            .strip_prefix("SELECT * FROM `")
            .and_then(|rest| rest.strip_suffix('`'))
            .ok_or_else(|| DumpError::query(format!("unsupported statement: {}", sql)))?;
        let name = quoted.replace("``", "`");

        let table = self
            .tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| DumpError::query(format!("Table 'shop.{}' doesn't exist", name)))?;

        if let Some(message) = &table.query_error {
            return Err(DumpError::query(message.clone()));
        }

        Ok(MemoryCursor {
            columns: table.columns.clone(),
            rows: table.rows.clone().into_iter(),
            fail_after: table.fail_after,
            served: 0,
        })
    }
}

#[async_trait]
impl QuerySource for MemorySource {
    async fn query<'s>(
        &'s mut self,
        sql: &'s str,
        _params: &'s [SqlValue<'static>],
    ) -> Result<Box<dyn RowCursor + 's>> {
        self.statements.push(sql.to_string());
        let cursor = if sql == "SHOW TABLES" {
            self.show_tables()?
        } else {
            self.select(sql)?
        };
        Ok(Box::new(cursor))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

pub struct MemoryCursor {
    columns: Option<Vec<String>>,
    rows: std::vec::IntoIter<Vec<SqlValue<'static>>>,
    fail_after: Option<usize>,
    served: usize,
}

#[async_trait]
impl RowCursor for MemoryCursor {
    fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    async fn next_row(&mut self) -> Result<Option<Vec<SqlValue<'static>>>> {
        if self.fail_after == Some(self.served) {
            return Err(DumpError::query("Lost connection to MySQL server during query"));
        }
        self.served += 1;
        Ok(self.rows.next())
    }
}

/// The `users (id, name)` table used throughout the tests.
pub fn users() -> MemoryTable {
    MemoryTable::new("users", &["id", "name"])
        .row(vec![SqlValue::I64(1), SqlValue::from("Jane\tDoe")])
        .row(vec![SqlValue::I64(2), SqlValue::Null])
}
