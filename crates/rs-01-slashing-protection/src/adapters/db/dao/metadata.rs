use super::{classify_insert, root_from_db, InsertOutcome};
use crate::error::StorageError;
use shared_types::Root;
use sqlx::SqliteConnection;

pub async fn find_genesis_root(conn: &mut SqliteConnection) -> Result<Option<Root>, StorageError> {
    let bytes: Option<Vec<u8>> =
        sqlx::query_scalar("SELECT genesis_validators_root FROM metadata WHERE id = 1")
            .fetch_optional(&mut *conn)
            .await?;
    bytes.map(|b| root_from_db("metadata", &b)).transpose()
}

pub async fn insert_genesis_root(
    conn: &mut SqliteConnection,
    root: &Root,
) -> Result<InsertOutcome, StorageError> {
    let result = sqlx::query("INSERT INTO metadata (id, genesis_validators_root) VALUES (1, ?)")
        .bind(root.as_bytes())
        .execute(&mut *conn)
        .await;
    classify_insert(result)
}
