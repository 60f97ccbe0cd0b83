//! Helpers for tests that need a real database.

use crate::adapters::db::{self, schema, DbConfig, RetryPolicy};
use crate::context::{PruningParameters, SlashingProtectionContext, SlashingProtectionParameters};
use crate::error::SlashingProtectionResult;
use shared_types::{BlsPublicKey, Root};
use std::path::Path;

/// Parameters for a database file at `path`, created if missing.
pub fn test_parameters(path: &Path) -> SlashingProtectionParameters {
    SlashingProtectionParameters {
        db: DbConfig::for_path(path).with_create_if_missing(true),
        pruning_pool_size: 1,
        retry: RetryPolicy::default(),
        require_genesis_root: false,
        pruning: PruningParameters::default(),
    }
}

/// Install the schema into the database at `path`.
pub async fn migrate_at(path: &Path) -> SlashingProtectionResult<()> {
    let config = DbConfig::for_path(path).with_create_if_missing(true);
    let pool = db::connect(&config, 1).await?;
    schema::migrate(&pool)
        .await
        .map_err(|source| crate::SlashingProtectionError::Infrastructure {
            operation: "migrate",
            attempts: 1,
            source,
        })?;
    pool.close().await;
    Ok(())
}

/// Migrated database plus a context over it.
pub async fn migrated_context(path: &Path) -> SlashingProtectionResult<SlashingProtectionContext> {
    migrate_at(path).await?;
    SlashingProtectionContext::create(&test_parameters(path)).await
}

pub fn make_public_key(id: u8) -> BlsPublicKey {
    BlsPublicKey([id; 48])
}

pub fn make_root(id: u8) -> Root {
    Root([id; 32])
}
