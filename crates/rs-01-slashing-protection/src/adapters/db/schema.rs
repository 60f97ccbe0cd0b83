//! # Schema
//!
//! | Table | Key | Notes |
//! |-------|-----|-------|
//! | `validators` | `id` | `public_key` unique |
//! | `signed_blocks` | `(validator_id, slot)` unique | |
//! | `signed_attestations` | `(validator_id, target_epoch)` unique | `source_epoch <= target_epoch` |
//! | `low_watermarks` | `validator_id` | raised only |
//! | `metadata` | `id = 1` | genesis validators root |
//! | `database_version` | `id = 1` | checked at startup |
//!
//! Slots and epochs are SQLite INTEGER (signed 64-bit).

use crate::adapters::db::dao::database_version;
use crate::error::StorageError;
use sqlx::SqlitePool;
use tracing::info;

/// Schema version this build reads and writes.
pub const EXPECTED_DATABASE_VERSION: i64 = 1;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS validators (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        public_key BLOB NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS signed_blocks (
        validator_id INTEGER NOT NULL REFERENCES validators(id),
        slot INTEGER NOT NULL,
        signing_root BLOB NOT NULL,
        UNIQUE (validator_id, slot)
    )",
    "CREATE TABLE IF NOT EXISTS signed_attestations (
        validator_id INTEGER NOT NULL REFERENCES validators(id),
        source_epoch INTEGER NOT NULL,
        target_epoch INTEGER NOT NULL,
        signing_root BLOB NOT NULL,
        UNIQUE (validator_id, target_epoch),
        CHECK (source_epoch <= target_epoch)
    )",
    "CREATE INDEX IF NOT EXISTS signed_attestations_source_idx
        ON signed_attestations (validator_id, source_epoch)",
    "CREATE TABLE IF NOT EXISTS low_watermarks (
        validator_id INTEGER PRIMARY KEY REFERENCES validators(id),
        slot INTEGER NOT NULL DEFAULT 0,
        source_epoch INTEGER NOT NULL DEFAULT 0,
        target_epoch INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS metadata (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        genesis_validators_root BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS database_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL
    )",
];

/// Create every table and stamp [`EXPECTED_DATABASE_VERSION`].
///
/// Provisioning helper for tests and opt-in startup; the version gate never
/// calls it.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    database_version::set(&mut *tx, EXPECTED_DATABASE_VERSION).await?;
    tx.commit().await?;

    info!(version = EXPECTED_DATABASE_VERSION, "Slashing protection schema installed");
    Ok(())
}
