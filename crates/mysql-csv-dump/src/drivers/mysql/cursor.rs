//! MySQL result cursor and per-column decoding.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};

use crate::core::{RowCursor, SqlValue};
use crate::error::Result;

/// How a column is decoded, derived from the server-reported type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Decimal,
    Text,
    Binary,
    Date,
    Time,
    DateTime,
    Other,
}

impl ColumnKind {
    /// Classify a sqlx MySQL type name such as `INT UNSIGNED` or `LONGBLOB`.
    pub(crate) fn from_type_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        let (base, unsigned) = match upper.strip_suffix(" UNSIGNED") {
            Some(base) => (base, true),
            None => (upper.as_str(), false),
        };

        match base {
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => {
                if unsigned {
                    ColumnKind::Unsigned
                } else {
                    ColumnKind::Signed
                }
            }
            "YEAR" | "BIT" => ColumnKind::Unsigned,
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" | "REAL" => ColumnKind::Double,
            "DECIMAL" | "NUMERIC" => ColumnKind::Decimal,
            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" | "JSON" => ColumnKind::Text,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" => ColumnKind::Binary,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            _ => ColumnKind::Other,
        }
    }
}

/// Decode every column of a row.
pub(crate) fn decode_row(row: &MySqlRow) -> Result<Vec<SqlValue<'static>>> {
    (0..row.len()).map(|idx| decode_column(row, idx)).collect()
}

fn decode_column(row: &MySqlRow, idx: usize) -> Result<SqlValue<'static>> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let kind = ColumnKind::from_type_name(raw.type_info().name());

    let value = match kind {
        ColumnKind::Signed => SqlValue::I64(row.try_get_unchecked::<i64, _>(idx)?),
        ColumnKind::Unsigned => SqlValue::U64(row.try_get_unchecked::<u64, _>(idx)?),
        ColumnKind::Float => SqlValue::F32(row.try_get_unchecked::<f32, _>(idx)?),
        ColumnKind::Double => SqlValue::F64(row.try_get_unchecked::<f64, _>(idx)?),
        ColumnKind::Decimal => SqlValue::decimal_owned(row.try_get_unchecked::<String, _>(idx)?),
        ColumnKind::Text => SqlValue::text_owned(row.try_get_unchecked::<String, _>(idx)?),
        ColumnKind::Binary => SqlValue::bytes_owned(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        ColumnKind::Date => match row.try_get_unchecked::<NaiveDate, _>(idx) {
            Ok(date) => SqlValue::Date(date),
            Err(e) => decode_raw_temporal(row, idx, false, e)?,
        },
        ColumnKind::Time => decode_time(row.try_get_unchecked::<MySqlTime, _>(idx)?),
        ColumnKind::DateTime => match row.try_get_unchecked::<NaiveDateTime, _>(idx) {
            Ok(datetime) => SqlValue::DateTime(datetime),
            Err(e) => decode_raw_temporal(row, idx, true, e)?,
        },
        // Unknown types: text when it decodes as UTF-8, raw bytes otherwise.
        ColumnKind::Other => match row.try_get_unchecked::<String, _>(idx) {
            Ok(s) => SqlValue::text_owned(s),
            Err(_) => SqlValue::bytes_owned(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        },
    };

    Ok(value)
}

/// TIME spans -838:59:59 to 838:59:59. Values outside a time of day are
/// kept as MySQL text.
fn decode_time(time: MySqlTime) -> SqlValue<'static> {
    if !time.is_negative() && time.hours() < 24 {
        if let Some(t) = NaiveTime::from_hms_micro_opt(
            time.hours(),
            u32::from(time.minutes()),
            u32::from(time.seconds()),
            time.microseconds(),
        ) {
            return SqlValue::Time(t);
        }
    }
    SqlValue::text_owned(format_mysql_time(
        time.is_negative(),
        time.hours(),
        time.minutes(),
        time.seconds(),
        time.microseconds(),
    ))
}

/// `[-]HH:MM:SS[.ffffff]`, hours padded to at least two digits.
pub(crate) fn format_mysql_time(
    negative: bool,
    hours: u32,
    minutes: u8,
    seconds: u8,
    micros: u32,
) -> String {
    let sign = if negative { "-" } else { "" };
    let mut out = format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds);
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

/// Fall back for DATE and DATETIME values chrono rejects, such as
/// `0000-00-00` or a zero month.
fn decode_raw_temporal(
    row: &MySqlRow,
    idx: usize,
    with_time: bool,
    original: sqlx::Error,
) -> Result<SqlValue<'static>> {
    let raw = match row.try_get_unchecked::<Vec<u8>, _>(idx) {
        Ok(raw) => raw,
        Err(_) => return Err(original.into()),
    };
    match format_raw_temporal(&raw, with_time) {
        Some(text) => Ok(SqlValue::text_owned(text)),
        None => Err(original.into()),
    }
}

/// Render a raw DATE or DATETIME value as MySQL text.
///
/// Binary protocol values keep their length prefix: 0, 4, 7 or 11 bytes of
/// year (u16 LE), month, day, hour, minute, second, microseconds (u32 LE).
/// Text protocol values are returned as they are.
pub(crate) fn format_raw_temporal(raw: &[u8], with_time: bool) -> Option<String> {
    if let Some((&len, body)) = raw.split_first() {
        if usize::from(len) == body.len() && matches!(len, 0 | 4 | 7 | 11) {
            return Some(format_binary_temporal(body, with_time));
        }
    } else {
        return Some(format_binary_temporal(&[], with_time));
    }
    std::str::from_utf8(raw).ok().map(str::to_string)
}

fn format_binary_temporal(body: &[u8], with_time: bool) -> String {
    let byte = |i: usize| body.get(i).copied().unwrap_or(0);
    let year = u16::from_le_bytes([byte(0), byte(1)]);
    let mut out = format!("{:04}-{:02}-{:02}", year, byte(2), byte(3));
    if with_time {
        out.push_str(&format!(" {:02}:{:02}:{:02}", byte(4), byte(5), byte(6)));
        let micros = u32::from_le_bytes([byte(7), byte(8), byte(9), byte(10)]);
        if micros != 0 {
            out.push_str(&format!(".{:06}", micros));
        }
    }
    out
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &SqlValue<'static>,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::I64(v) => query.bind(*v),
        SqlValue::U64(v) => query.bind(*v),
        SqlValue::F32(v) => query.bind(*v),
        SqlValue::F64(v) => query.bind(*v),
        SqlValue::Decimal(v) | SqlValue::Text(v) => query.bind(v.to_string()),
        SqlValue::Bytes(v) => query.bind(v.to_vec()),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::Time(v) => query.bind(*v),
        SqlValue::DateTime(v) => query.bind(*v),
    }
}

/// Streaming cursor over one MySQL result set.
pub struct MysqlCursor<'c> {
    columns: Option<Vec<String>>,
    rows: BoxStream<'c, std::result::Result<MySqlRow, sqlx::Error>>,
}

impl<'c> MysqlCursor<'c> {
    /// Describe `sql`, then start streaming its rows over `conn`.
    ///
    /// The column list comes from the prepared statement, so it is known
    /// even when the result set is empty.
    pub async fn open(
        conn: &'c mut MySqlConnection,
        sql: &'c str,
        params: &'c [SqlValue<'static>],
    ) -> Result<Self> {
        let statement = (&mut *conn).prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }

        Ok(Self {
            columns: (!columns.is_empty()).then_some(columns),
            rows: query.fetch(conn),
        })
    }
}

#[async_trait]
impl<'c> RowCursor for MysqlCursor<'c> {
    fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    async fn next_row(&mut self) -> Result<Option<Vec<SqlValue<'static>>>> {
        match self.rows.try_next().await? {
            Some(row) => decode_row(&row).map(Some),
            None => Ok(None),
        }
    }
}
