//! # Genesis-Consistency Guard
//!
//! The first genesis validators root seen is bound to the database for good.

use crate::adapters::db::dao::{metadata, InsertOutcome};
use crate::error::StorageError;
use shared_types::Root;
use sqlx::SqliteConnection;
use tracing::{info, warn};

/// Seed `candidate` when no root is recorded, then compare.
///
/// Returns `false` without writing anything on mismatch.
pub async fn check_and_seed(
    conn: &mut SqliteConnection,
    candidate: Root,
) -> Result<bool, StorageError> {
    let recorded = match metadata::find_genesis_root(conn).await? {
        Some(recorded) => recorded,
        None => match metadata::insert_genesis_root(conn, &candidate).await? {
            InsertOutcome::Inserted => {
                info!(genesis_validators_root = %candidate, "Recorded genesis validators root");
                return Ok(true);
            }
            InsertOutcome::Conflict => match metadata::find_genesis_root(conn).await? {
                Some(recorded) => recorded,
                None => {
                    return Err(StorageError::Corrupt {
                        table: "metadata",
                        reason: "conflicting insert left no genesis row".to_string(),
                    })
                }
            },
        },
    };

    if recorded != candidate {
        warn!(
            expected = %recorded,
            received = %candidate,
            "Genesis validators root mismatch"
        );
        return Ok(false);
    }
    Ok(true)
}

pub async fn root_exists(conn: &mut SqliteConnection) -> Result<bool, StorageError> {
    Ok(metadata::find_genesis_root(conn).await?.is_some())
}
