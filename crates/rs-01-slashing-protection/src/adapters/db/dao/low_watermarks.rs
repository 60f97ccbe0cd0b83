use super::{from_db, to_db};
use crate::domain::{LowWatermark, ValidatorId};
use crate::error::StorageError;
use sqlx::SqliteConnection;

const TABLE: &str = "low_watermarks";

pub async fn find(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
) -> Result<Option<LowWatermark>, StorageError> {
    let row: Option<(i64, i64, i64)> = sqlx::query_as(
        "SELECT slot, source_epoch, target_epoch FROM low_watermarks WHERE validator_id = ?",
    )
    .bind(validator_id.0)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|(slot, source, target)| {
        Ok(LowWatermark {
            validator_id,
            slot: from_db(TABLE, slot)?,
            source_epoch: from_db(TABLE, source)?,
            target_epoch: from_db(TABLE, target)?,
        })
    })
    .transpose()
}

/// Upsert that only ever raises each column.
pub async fn raise(
    conn: &mut SqliteConnection,
    watermark: &LowWatermark,
) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO low_watermarks (validator_id, slot, source_epoch, target_epoch)
         VALUES (?, ?, ?, ?)
         ON CONFLICT (validator_id) DO UPDATE SET
            slot = MAX(slot, excluded.slot),
            source_epoch = MAX(source_epoch, excluded.source_epoch),
            target_epoch = MAX(target_epoch, excluded.target_epoch)",
    )
    .bind(watermark.validator_id.0)
    .bind(to_db("slot", watermark.slot)?)
    .bind(to_db("source_epoch", watermark.source_epoch)?)
    .bind(to_db("target_epoch", watermark.target_epoch)?)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
