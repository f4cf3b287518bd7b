//! MySQL query sources: a pooled connection or an open transaction.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::pool::PoolConnection;
use sqlx::Transaction;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::{QuerySource, RowCursor, SqlValue};
use crate::error::{DumpError, Result};

use super::cursor::MysqlCursor;

/// Pool acquire timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse an `--ssl-mode` value (`disabled`, `preferred`, `required`,
/// `verify_ca`, `verify_identity`).
pub fn parse_ssl_mode(value: &str) -> Result<MySqlSslMode> {
    let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
    MySqlSslMode::from_str(&normalized).map_err(|_| {
        DumpError::Config(format!(
            "ssl mode must be disabled, preferred, required, verify_ca or verify_identity, got '{}'",
            value
        ))
    })
}

/// Open a single-connection pool against the source database.
///
/// The export is sequential, so one connection is all it ever uses.
pub async fn connect(config: &SourceConfig) -> Result<MySqlPool> {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
        .ssl_mode(parse_ssl_mode(&config.ssl_mode)?);

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(POOL_CONNECTION_TIMEOUT)
        .connect_with(options)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    info!(
        "Connected to MySQL: {}:{}/{}",
        config.host, config.port, config.database
    );

    Ok(pool)
}

/// Queries run directly on a pooled connection, each statement in autocommit.
pub struct MysqlConnection {
    conn: PoolConnection<MySql>,
}

impl MysqlConnection {
    /// Take the connection out of `pool` for the lifetime of the session.
    pub async fn acquire(pool: &MySqlPool) -> Result<Self> {
        let conn = pool.acquire().await?;
        debug!("Acquired MySQL connection");
        Ok(Self { conn })
    }
}

#[async_trait]
impl QuerySource for MysqlConnection {
    async fn query<'s>(
        &'s mut self,
        sql: &'s str,
        params: &'s [SqlValue<'static>],
    ) -> Result<Box<dyn RowCursor + 's>> {
        let cursor = MysqlCursor::open(&mut self.conn, sql, params).await?;
        Ok(Box::new(cursor))
    }

    fn kind(&self) -> &'static str {
        "connection"
    }
}

/// Queries run inside one transaction so every table sees the same snapshot.
///
/// The transaction is never committed. Call [`MysqlTransaction::rollback`]
/// when done; dropping it without that also rolls back.
pub struct MysqlTransaction {
    tx: Transaction<'static, MySql>,
}

impl MysqlTransaction {
    /// Begin a transaction on a connection from `pool`.
    pub async fn begin(pool: &MySqlPool) -> Result<Self> {
        let tx = pool.begin().await?;
        debug!("Started MySQL transaction");
        Ok(Self { tx })
    }

    /// End the transaction without committing.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        debug!("Rolled back MySQL transaction");
        Ok(())
    }
}

#[async_trait]
impl QuerySource for MysqlTransaction {
    async fn query<'s>(
        &'s mut self,
        sql: &'s str,
        params: &'s [SqlValue<'static>],
    ) -> Result<Box<dyn RowCursor + 's>> {
        let cursor = MysqlCursor::open(&mut self.tx, sql, params).await?;
        Ok(Box::new(cursor))
    }

    fn kind(&self) -> &'static str {
        "transaction"
    }
}
