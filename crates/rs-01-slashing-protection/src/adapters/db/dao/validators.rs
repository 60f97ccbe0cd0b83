use super::{classify_insert, InsertOutcome};
use crate::domain::ValidatorId;
use crate::error::StorageError;
use shared_types::BlsPublicKey;
use sqlx::SqliteConnection;

pub async fn find_id(
    conn: &mut SqliteConnection,
    public_key: &BlsPublicKey,
) -> Result<Option<ValidatorId>, StorageError> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM validators WHERE public_key = ?")
        .bind(public_key.as_bytes())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id.map(ValidatorId))
}

pub async fn insert(
    conn: &mut SqliteConnection,
    public_key: &BlsPublicKey,
) -> Result<InsertOutcome, StorageError> {
    let result = sqlx::query("INSERT INTO validators (public_key) VALUES (?)")
        .bind(public_key.as_bytes())
        .execute(&mut *conn)
        .await;
    classify_insert(result)
}

/// Insert first; when the key is already present, read its id back.
pub async fn resolve_or_insert(
    conn: &mut SqliteConnection,
    public_key: &BlsPublicKey,
) -> Result<ValidatorId, StorageError> {
    insert(conn, public_key).await?;
    find_id(conn, public_key)
        .await?
        .ok_or_else(|| StorageError::Corrupt {
            table: "validators",
            reason: format!("no row for {} after insert", public_key),
        })
}

pub async fn all_ids(conn: &mut SqliteConnection) -> Result<Vec<ValidatorId>, StorageError> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM validators ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids.into_iter().map(ValidatorId).collect())
}
