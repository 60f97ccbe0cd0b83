//! Table access.
//!
//! One module per table. Every function takes the transaction's connection,
//! so callers decide the transaction boundaries.

pub mod database_version;
pub mod low_watermarks;
pub mod metadata;
pub mod signed_attestations;
pub mod signed_blocks;
pub mod validators;

use crate::error::StorageError;
use shared_types::Root;
use sqlx::sqlite::SqliteQueryResult;

/// Result of an insert guarded by a uniqueness constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same unique key already exists.
    Conflict,
}

pub(crate) fn to_db(field: &'static str, value: u64) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::OutOfRange { field, value })
}

pub(crate) fn from_db(table: &'static str, value: i64) -> Result<u64, StorageError> {
    u64::try_from(value).map_err(|_| StorageError::Corrupt {
        table,
        reason: format!("negative value {}", value),
    })
}

pub(crate) fn root_from_db(table: &'static str, bytes: &[u8]) -> Result<Root, StorageError> {
    Root::from_slice(bytes).map_err(|e| StorageError::Corrupt {
        table,
        reason: e.to_string(),
    })
}

/// Map an insert result onto [`InsertOutcome`].
///
/// Unique and primary key clashes are conflicts; any other constraint
/// failure is not explained by the slashing rules and is an error.
pub(crate) fn classify_insert(
    result: Result<SqliteQueryResult, sqlx::Error>,
) -> Result<InsertOutcome, StorageError> {
    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(InsertOutcome::Conflict)
        }
        Err(sqlx::Error::Database(db_err))
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
        {
            Err(StorageError::ConstraintViolation(db_err.message().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
