//! # Slashing Protection Context
//!
//! Startup wiring. Construction fails before anything can decide when the
//! database is unreachable, the schema version is wrong, or a required
//! genesis root is absent.

use crate::adapters::db::{self, Database, DbConfig, RetryPolicy};
use crate::error::{ConfigurationError, SlashingProtectionResult};
use crate::ports::inbound::SlashingProtection;
use crate::service::{version_gate, DbSlashingProtection, DEFAULT_BATCH_SIZE};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Retention settings for scheduled pruning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PruningParameters {
    pub enabled: bool,
    pub epochs_to_keep: u64,
    pub slots_per_epoch: u64,
    pub interval: Duration,
    pub at_boot: bool,
    pub batch_size: u64,
}

impl Default for PruningParameters {
    fn default() -> Self {
        Self {
            enabled: false,
            epochs_to_keep: 250,
            slots_per_epoch: 32,
            interval: Duration::from_secs(24 * 60 * 60),
            at_boot: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PruningParameters {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.epochs_to_keep < 1 {
            return Err(ConfigurationError::InvalidParameters(
                "pruning epochs to keep must be at least 1".to_string(),
            ));
        }
        if self.slots_per_epoch < 1 {
            return Err(ConfigurationError::InvalidParameters(
                "pruning slots per epoch must be at least 1".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(ConfigurationError::InvalidParameters(
                "pruning interval must be at least 1 hour".to_string(),
            ));
        }
        if self.batch_size < 1 {
            return Err(ConfigurationError::InvalidParameters(
                "pruning batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything needed to build a [`SlashingProtectionContext`].
#[derive(Clone, Debug, Default)]
pub struct SlashingProtectionParameters {
    pub db: DbConfig,
    /// Connections in the separate pruning pool.
    pub pruning_pool_size: u32,
    pub retry: RetryPolicy,
    pub require_genesis_root: bool,
    pub pruning: PruningParameters,
}

impl SlashingProtectionParameters {
    pub fn new(db: DbConfig) -> Self {
        Self {
            db,
            pruning_pool_size: 1,
            ..Self::default()
        }
    }
}

pub struct SlashingProtectionContext {
    protection: Arc<DbSlashingProtection>,
    pruning: PruningParameters,
}

impl SlashingProtectionContext {
    pub async fn create(params: &SlashingProtectionParameters) -> SlashingProtectionResult<Self> {
        params.pruning.validate()?;

        let pool = db::connect(&params.db, params.db.max_connections).await?;
        version_gate::verify(&pool, &params.db.url).await?;
        let pruning_pool = db::connect(&params.db, params.pruning_pool_size).await?;

        let protection = DbSlashingProtection::new(
            Database::new(pool, params.retry),
            Database::new(pruning_pool, params.retry),
            params.pruning.batch_size,
        );

        if params.require_genesis_root && !protection.genesis_root_exists().await? {
            return Err(ConfigurationError::MissingGenesisRoot.into());
        }

        info!(
            url = %params.db.url,
            pool_size = params.db.max_connections,
            pruning_pool_size = params.pruning_pool_size,
            pruning_enabled = params.pruning.enabled,
            "Slashing protection ready"
        );

        Ok(Self {
            protection: Arc::new(protection),
            pruning: params.pruning.clone(),
        })
    }

    pub fn slashing_protection(&self) -> Arc<DbSlashingProtection> {
        Arc::clone(&self.protection)
    }

    pub fn pruning(&self) -> &PruningParameters {
        &self.pruning
    }

    /// Close the decision pool and the pruning pool.
    pub async fn close(&self) {
        self.protection.database().close().await;
        self.protection.pruning_database().close().await;
    }
}
