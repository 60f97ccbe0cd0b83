//! # Validator Registry
//!
//! Public key → stable id. The `validators` table is the source of truth;
//! the in-process map only remembers answers already read from it and is
//! never invalidated while the process runs.
//!
//! Concurrent first registrations of the same key race on the unique
//! `public_key` constraint, not on the cache lock.

use crate::adapters::db::dao::validators;
use crate::adapters::db::Database;
use crate::domain::ValidatorId;
use crate::error::SlashingProtectionResult;
use parking_lot::RwLock;
use shared_types::BlsPublicKey;
use std::collections::HashMap;
use tracing::{debug, info};

pub struct RegisteredValidators {
    db: Database,
    cache: RwLock<HashMap<BlsPublicKey, ValidatorId>>,
}

impl RegisteredValidators {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached id, without touching the database.
    pub fn cached(&self, public_key: &BlsPublicKey) -> Option<ValidatorId> {
        self.cache.read().get(public_key).copied()
    }

    pub async fn resolve_or_register(
        &self,
        public_key: &BlsPublicKey,
    ) -> SlashingProtectionResult<ValidatorId> {
        if let Some(id) = self.cached(public_key) {
            return Ok(id);
        }

        let key = *public_key;
        let id = self
            .db
            .in_transaction("resolve_validator", move |conn| {
                Box::pin(async move { validators::resolve_or_insert(conn, &key).await })
            })
            .await?;

        self.cache.write().insert(key, id);
        debug!(public_key = %key, validator_id = %id, "Resolved validator");
        Ok(id)
    }

    /// Register every key in one transaction.
    pub async fn register_validators(
        &self,
        public_keys: &[BlsPublicKey],
    ) -> SlashingProtectionResult<Vec<ValidatorId>> {
        let keys: Vec<BlsPublicKey> = public_keys.to_vec();
        let ids = self
            .db
            .in_transaction("register_validators", move |conn| {
                let keys = keys.clone();
                Box::pin(async move {
                    let mut ids = Vec::with_capacity(keys.len());
                    for key in &keys {
                        ids.push(validators::resolve_or_insert(conn, key).await?);
                    }
                    Ok(ids)
                })
            })
            .await?;

        let mut cache = self.cache.write();
        for (key, id) in public_keys.iter().zip(&ids) {
            cache.insert(*key, *id);
        }
        drop(cache);

        info!(count = ids.len(), "Registered validators for slashing protection");
        Ok(ids)
    }

    pub async fn validator_id(
        &self,
        public_key: &BlsPublicKey,
    ) -> SlashingProtectionResult<Option<ValidatorId>> {
        if let Some(id) = self.cached(public_key) {
            return Ok(Some(id));
        }

        let key = *public_key;
        let id = self
            .db
            .in_transaction("find_validator", move |conn| {
                Box::pin(async move { validators::find_id(conn, &key).await })
            })
            .await?;

        if let Some(id) = id {
            self.cache.write().insert(key, id);
        }
        Ok(id)
    }

    /// Ids of every registered validator, cached or not.
    pub async fn all_ids(&self) -> SlashingProtectionResult<Vec<ValidatorId>> {
        self.db
            .in_transaction("list_validators", |conn| {
                Box::pin(async move { validators::all_ids(conn).await })
            })
            .await
    }
}
