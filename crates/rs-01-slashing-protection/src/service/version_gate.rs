//! # Schema Version Gate
//!
//! Runs once, before any decision can be made. Never migrates.

use crate::adapters::db::dao::database_version;
use crate::adapters::db::schema::EXPECTED_DATABASE_VERSION;
use crate::error::ConfigurationError;
use sqlx::SqlitePool;
use tracing::info;

pub async fn verify(pool: &SqlitePool, url: &str) -> Result<i64, ConfigurationError> {
    verify_expected(pool, url, EXPECTED_DATABASE_VERSION).await
}

pub async fn verify_expected(
    pool: &SqlitePool,
    url: &str,
    expected: i64,
) -> Result<i64, ConfigurationError> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|source| ConfigurationError::ConnectionFailed {
            url: url.to_string(),
            source,
        })?;

    match database_version::find(&mut *conn).await {
        Err(source) => Err(ConfigurationError::VersionUnreadable { expected, source }),
        Ok(None) => Err(ConfigurationError::VersionMissing { expected }),
        Ok(Some(found)) if found != expected => {
            Err(ConfigurationError::VersionMismatch { found, expected })
        }
        Ok(Some(found)) => {
            info!(version = found, "Slashing protection database version verified");
            Ok(found)
        }
    }
}
