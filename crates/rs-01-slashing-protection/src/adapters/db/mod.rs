//! # SQLite Persistence
//!
//! Every protected operation runs as one closure inside one transaction:
//!
//! ```text
//! in_transaction(op, f)
//!   loop:
//!     tx = BEGIN IMMEDIATE
//!     f(&mut tx)?          ← any error drops tx (rollback)
//!     tx.commit()
//!     retryable error and attempts left? → warn, backoff, again
//! ```
//!
//! Transactions take the write lock up front, so a contended decision waits
//! out `busy_timeout` instead of failing when it reaches its first write.
//! SQLite transactions are serializable. The uniqueness constraints on
//! `signed_blocks` and `signed_attestations` still back up the rule checks.

pub mod dao;
pub mod retry;
pub mod schema;

pub use retry::RetryPolicy;

use crate::error::{ConfigurationError, SlashingProtectionError, StorageError};
use crate::metrics;
use futures::future::BoxFuture;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for the slashing protection database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    /// `sqlite://` URL of the database file.
    pub url: String,
    /// Connections in the pool.
    pub max_connections: u32,
    /// How long to wait for a free pooled connection.
    pub acquire_timeout: Duration,
    /// How long SQLite waits on a locked database before reporting BUSY.
    pub busy_timeout: Duration,
    /// Create the file when absent.
    pub create_if_missing: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/slashing-protection.db".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_millis(5000),
            create_if_missing: false,
        }
    }
}

impl DbConfig {
    /// Config for a database file at `path`.
    pub fn for_path(path: &std::path::Path) -> Self {
        Self {
            url: format!("sqlite://{}", path.display()),
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }
}

/// Open a pool of `max_connections` against `config.url`.
///
/// At least one connection is established before returning, so an
/// unreachable or missing database fails here.
pub async fn connect(
    config: &DbConfig,
    max_connections: u32,
) -> Result<SqlitePool, ConfigurationError> {
    let connection_failed = |source: sqlx::Error| ConfigurationError::ConnectionFailed {
        url: config.url.clone(),
        source,
    };

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(connection_failed)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout)
        .create_if_missing(config.create_if_missing);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(connection_failed)?;

    debug!(url = %config.url, max_connections, "Opened slashing protection pool");
    Ok(pool)
}

/// Pooled transactional handle.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl Database {
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run `f` in a fresh transaction, retrying on transient failures.
    ///
    /// `f` may be called more than once and must only touch the database
    /// through the connection it is given.
    pub async fn in_transaction<T, F>(
        &self,
        operation: &'static str,
        f: F,
    ) -> Result<T, SlashingProtectionError>
    where
        T: Send,
        F: for<'c> Fn(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, StorageError>>
            + Send
            + Sync,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.attempt(&f).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && self.retry.allows_retry(attempts) => {
                    warn!(
                        operation,
                        attempts,
                        error = %err,
                        "Retrying slashing protection transaction"
                    );
                    metrics::record_retry(operation);
                    if !self.retry.backoff.is_zero() {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
                Err(source) => {
                    return Err(SlashingProtectionError::Infrastructure {
                        operation,
                        attempts,
                        source,
                    })
                }
            }
        }
    }

    async fn attempt<T, F>(&self, f: &F) -> Result<T, StorageError>
    where
        F: for<'c> Fn(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, StorageError>>,
    {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        let value = f(&mut *tx).await?;
        tx.commit().await?;
        Ok(value)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
