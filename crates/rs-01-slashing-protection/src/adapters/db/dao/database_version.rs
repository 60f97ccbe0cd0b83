use crate::error::StorageError;
use sqlx::SqliteConnection;

pub async fn find(conn: &mut SqliteConnection) -> Result<Option<i64>, StorageError> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM database_version WHERE id = 1")
            .fetch_optional(&mut *conn)
            .await?;
    Ok(version)
}

pub async fn set(conn: &mut SqliteConnection, version: i64) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO database_version (id, version) VALUES (1, ?)
         ON CONFLICT (id) DO UPDATE SET version = excluded.version",
    )
    .bind(version)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn clear(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM database_version")
        .execute(&mut *conn)
        .await?;
    Ok(())
}
