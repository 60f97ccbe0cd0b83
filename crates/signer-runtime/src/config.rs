//! Signer configuration.
//!
//! Defaults live in plain structs. `SignerConfig::from_env` overrides them
//! from `SIGNER_*` variables; a variable that is set but unparsable is an
//! error, never a silent fallback.

use rs_01_slashing_protection::{
    DbConfig, PruningParameters, RetryPolicy, SlashingProtectionParameters,
};
use signer_telemetry::TelemetryConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Complete signer configuration.
#[derive(Clone, Debug, Default)]
pub struct SignerConfig {
    pub database: DatabaseConfig,
    pub protection: ProtectionConfig,
    pub pruning: PruningParameters,
    pub keys: KeysConfig,
    pub telemetry: TelemetryConfig,
}

/// Slashing protection database settings.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub pruning_pool_size: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
    /// Create the file and install the schema at startup.
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let db = DbConfig::default();
        Self {
            url: db.url,
            pool_size: db.max_connections,
            pruning_pool_size: 1,
            acquire_timeout: db.acquire_timeout,
            busy_timeout: db.busy_timeout,
            auto_migrate: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProtectionConfig {
    pub enabled: bool,
    pub require_genesis_root: bool,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            require_genesis_root: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeysConfig {
    /// Directory of signing metadata YAML files.
    pub path: PathBuf,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./keys"),
        }
    }
}

impl SignerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let db = &mut config.database;
        if let Some(url) = lookup("SIGNER_DB_URL") {
            db.url = url;
        }
        override_with(&lookup, "SIGNER_DB_POOL_SIZE", &mut db.pool_size)?;
        override_with(&lookup, "SIGNER_DB_PRUNING_POOL_SIZE", &mut db.pruning_pool_size)?;
        if let Some(secs) = parse::<u64, _>(&lookup, "SIGNER_DB_ACQUIRE_TIMEOUT_SECS")? {
            db.acquire_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "SIGNER_DB_BUSY_TIMEOUT_MS")? {
            db.busy_timeout = Duration::from_millis(ms);
        }
        override_flag(&lookup, "SIGNER_DB_AUTO_MIGRATE", &mut db.auto_migrate)?;

        let protection = &mut config.protection;
        override_flag(&lookup, "SIGNER_SLASHING_PROTECTION_ENABLED", &mut protection.enabled)?;
        override_flag(
            &lookup,
            "SIGNER_REQUIRE_GENESIS_ROOT",
            &mut protection.require_genesis_root,
        )?;

        let pruning = &mut config.pruning;
        override_flag(&lookup, "SIGNER_PRUNING_ENABLED", &mut pruning.enabled)?;
        override_with(&lookup, "SIGNER_PRUNING_EPOCHS_TO_KEEP", &mut pruning.epochs_to_keep)?;
        override_with(&lookup, "SIGNER_PRUNING_SLOTS_PER_EPOCH", &mut pruning.slots_per_epoch)?;
        if let Some(hours) = parse::<u64, _>(&lookup, "SIGNER_PRUNING_INTERVAL_HOURS")? {
            let secs = hours
                .checked_mul(60 * 60)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "SIGNER_PRUNING_INTERVAL_HOURS",
                    value: hours.to_string(),
                })?;
            pruning.interval = Duration::from_secs(secs);
        }
        override_flag(&lookup, "SIGNER_PRUNING_AT_BOOT", &mut pruning.at_boot)?;
        override_with(&lookup, "SIGNER_PRUNING_BATCH_SIZE", &mut pruning.batch_size)?;

        if let Some(path) = lookup("SIGNER_KEY_CONFIG_PATH") {
            config.keys.path = PathBuf::from(path);
        }

        config.telemetry = TelemetryConfig::from_lookup(&lookup);
        Ok(config)
    }

    /// Parameters for opening the slashing protection database.
    pub fn slashing_protection_parameters(&self) -> SlashingProtectionParameters {
        SlashingProtectionParameters {
            db: DbConfig {
                url: self.database.url.clone(),
                max_connections: self.database.pool_size,
                acquire_timeout: self.database.acquire_timeout,
                busy_timeout: self.database.busy_timeout,
                create_if_missing: self.database.auto_migrate,
            },
            pruning_pool_size: self.database.pruning_pool_size,
            retry: RetryPolicy::default(),
            require_genesis_root: self.protection.require_genesis_root,
            pruning: self.pruning.clone(),
        }
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

fn override_with<T, F>(lookup: &F, key: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = parse(lookup, key)? {
        *target = value;
    }
    Ok(())
}

fn override_flag<F>(lookup: &F, key: &'static str, target: &mut bool) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *target = match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => return Err(ConfigError::InvalidValue { key, value }),
        };
    }
    Ok(())
}
