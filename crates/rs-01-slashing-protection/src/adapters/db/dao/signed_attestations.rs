use super::{classify_insert, from_db, root_from_db, to_db, InsertOutcome};
use crate::domain::{SignedAttestation, ValidatorId};
use crate::error::StorageError;
use shared_types::Epoch;
use sqlx::SqliteConnection;

const TABLE: &str = "signed_attestations";

type AttestationRow = (i64, i64, Vec<u8>);

fn decode(
    validator_id: ValidatorId,
    row: AttestationRow,
) -> Result<SignedAttestation, StorageError> {
    let (source, target, root) = row;
    Ok(SignedAttestation {
        validator_id,
        source_epoch: from_db(TABLE, source)?,
        target_epoch: from_db(TABLE, target)?,
        signing_root: root_from_db(TABLE, &root)?,
    })
}

pub async fn find_at_target(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    target_epoch: Epoch,
) -> Result<Vec<SignedAttestation>, StorageError> {
    let rows: Vec<AttestationRow> = sqlx::query_as(
        "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
         WHERE validator_id = ? AND target_epoch = ?",
    )
    .bind(validator_id.0)
    .bind(to_db("target_epoch", target_epoch)?)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(|row| decode(validator_id, row)).collect()
}

/// A recorded attestation that strictly encloses `(source, target)`.
pub async fn find_enclosing(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    source_epoch: Epoch,
    target_epoch: Epoch,
) -> Result<Option<SignedAttestation>, StorageError> {
    let row: Option<AttestationRow> = sqlx::query_as(
        "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
         WHERE validator_id = ? AND source_epoch < ? AND target_epoch > ?
         LIMIT 1",
    )
    .bind(validator_id.0)
    .bind(to_db("source_epoch", source_epoch)?)
    .bind(to_db("target_epoch", target_epoch)?)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|row| decode(validator_id, row)).transpose()
}

/// A recorded attestation strictly enclosed by `(source, target)`.
pub async fn find_enclosed(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    source_epoch: Epoch,
    target_epoch: Epoch,
) -> Result<Option<SignedAttestation>, StorageError> {
    let row: Option<AttestationRow> = sqlx::query_as(
        "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
         WHERE validator_id = ? AND source_epoch > ? AND target_epoch < ?
         LIMIT 1",
    )
    .bind(validator_id.0)
    .bind(to_db("source_epoch", source_epoch)?)
    .bind(to_db("target_epoch", target_epoch)?)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|row| decode(validator_id, row)).transpose()
}

pub async fn insert(
    conn: &mut SqliteConnection,
    attestation: &SignedAttestation,
) -> Result<InsertOutcome, StorageError> {
    let result = sqlx::query(
        "INSERT INTO signed_attestations (validator_id, source_epoch, target_epoch, signing_root)
         VALUES (?, ?, ?, ?)",
    )
    .bind(attestation.validator_id.0)
    .bind(to_db("source_epoch", attestation.source_epoch)?)
    .bind(to_db("target_epoch", attestation.target_epoch)?)
    .bind(attestation.signing_root.as_bytes())
    .execute(&mut *conn)
    .await;
    classify_insert(result)
}

pub async fn max_target_epoch(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
) -> Result<Option<Epoch>, StorageError> {
    let epoch: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(target_epoch) FROM signed_attestations WHERE validator_id = ?",
    )
    .bind(validator_id.0)
    .fetch_one(&mut *conn)
    .await?;
    epoch.map(|e| from_db(TABLE, e)).transpose()
}

/// `(source, target)` of the recorded attestation with the lowest target at
/// or above `floor`.
pub async fn lowest_at_or_above(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    floor: Epoch,
) -> Result<Option<(Epoch, Epoch)>, StorageError> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT source_epoch, target_epoch FROM signed_attestations
         WHERE validator_id = ? AND target_epoch >= ?
         ORDER BY target_epoch ASC
         LIMIT 1",
    )
    .bind(validator_id.0)
    .bind(to_db("target_epoch", floor)?)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|(source, target)| Ok((from_db(TABLE, source)?, from_db(TABLE, target)?)))
        .transpose()
}

/// Delete at most `limit` rows with `target_epoch < below`.
pub async fn delete_below(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    below: Epoch,
    limit: u64,
) -> Result<u64, StorageError> {
    let result = sqlx::query(
        "DELETE FROM signed_attestations WHERE rowid IN (
            SELECT rowid FROM signed_attestations
            WHERE validator_id = ? AND target_epoch < ?
            LIMIT ?
        )",
    )
    .bind(validator_id.0)
    .bind(to_db("target_epoch", below)?)
    .bind(to_db("batch_size", limit)?)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Every recorded attestation for the validator, by target epoch.
pub async fn all_for(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
) -> Result<Vec<SignedAttestation>, StorageError> {
    let rows: Vec<AttestationRow> = sqlx::query_as(
        "SELECT source_epoch, target_epoch, signing_root FROM signed_attestations
         WHERE validator_id = ? ORDER BY target_epoch",
    )
    .bind(validator_id.0)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(|row| decode(validator_id, row)).collect()
}
