use super::{classify_insert, from_db, root_from_db, to_db, InsertOutcome};
use crate::domain::{SignedBlock, ValidatorId};
use crate::error::StorageError;
use shared_types::Slot;
use sqlx::SqliteConnection;

const TABLE: &str = "signed_blocks";

pub async fn find_at_slot(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    slot: Slot,
) -> Result<Option<SignedBlock>, StorageError> {
    let row: Option<Vec<u8>> = sqlx::query_scalar(
        "SELECT signing_root FROM signed_blocks WHERE validator_id = ? AND slot = ?",
    )
    .bind(validator_id.0)
    .bind(to_db("slot", slot)?)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|root| {
        Ok(SignedBlock {
            validator_id,
            slot,
            signing_root: root_from_db(TABLE, &root)?,
        })
    })
    .transpose()
}

pub async fn insert(
    conn: &mut SqliteConnection,
    block: &SignedBlock,
) -> Result<InsertOutcome, StorageError> {
    let result = sqlx::query(
        "INSERT INTO signed_blocks (validator_id, slot, signing_root) VALUES (?, ?, ?)",
    )
    .bind(block.validator_id.0)
    .bind(to_db("slot", block.slot)?)
    .bind(block.signing_root.as_bytes())
    .execute(&mut *conn)
    .await;
    classify_insert(result)
}

pub async fn max_slot(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
) -> Result<Option<Slot>, StorageError> {
    let slot: Option<i64> =
        sqlx::query_scalar("SELECT MAX(slot) FROM signed_blocks WHERE validator_id = ?")
            .bind(validator_id.0)
            .fetch_one(&mut *conn)
            .await?;
    slot.map(|s| from_db(TABLE, s)).transpose()
}

/// Lowest recorded slot at or above `floor`.
pub async fn min_slot_at_or_above(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    floor: Slot,
) -> Result<Option<Slot>, StorageError> {
    let slot: Option<i64> = sqlx::query_scalar(
        "SELECT MIN(slot) FROM signed_blocks WHERE validator_id = ? AND slot >= ?",
    )
    .bind(validator_id.0)
    .bind(to_db("slot", floor)?)
    .fetch_one(&mut *conn)
    .await?;
    slot.map(|s| from_db(TABLE, s)).transpose()
}

/// Delete at most `limit` rows with `slot < below`. Returns the number deleted.
pub async fn delete_below(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    below: Slot,
    limit: u64,
) -> Result<u64, StorageError> {
    let result = sqlx::query(
        "DELETE FROM signed_blocks WHERE rowid IN (
            SELECT rowid FROM signed_blocks WHERE validator_id = ? AND slot < ? LIMIT ?
        )",
    )
    .bind(validator_id.0)
    .bind(to_db("slot", below)?)
    .bind(to_db("batch_size", limit)?)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
) -> Result<u64, StorageError> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM signed_blocks WHERE validator_id = ?")
        .bind(validator_id.0)
        .fetch_one(&mut *conn)
        .await?;
    from_db(TABLE, n)
}
