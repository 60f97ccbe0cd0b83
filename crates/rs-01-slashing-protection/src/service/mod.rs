//! Service layer: the database-backed slashing protection.
//!
//! ```text
//! SigningHandler ──→ DbSlashingProtection
//!                      ├── RegisteredValidators   (decision pool)
//!                      ├── engine::decide_*       (decision pool, one tx each)
//!                      └── Pruner                 (pruning pool)
//! ```

pub mod engine;
pub mod genesis;
pub mod pruner;
pub mod registry;
pub mod version_gate;

pub use pruner::{Pruner, DEFAULT_BATCH_SIZE};
pub use registry::RegisteredValidators;

use crate::adapters::db::Database;
use crate::domain::{
    Decision, DenyReason, PruneSummary, RetentionPolicy, SignedAttestation, SignedBlock,
    ValidatorId,
};
use crate::error::SlashingProtectionResult;
use crate::metrics;
use crate::ports::inbound::SlashingProtection;
use async_trait::async_trait;
use shared_types::{BlsPublicKey, Epoch, Root, Slot};
use tracing::{debug, warn};

const BLOCK: &str = "block";
const ATTESTATION: &str = "attestation";

pub struct DbSlashingProtection {
    db: Database,
    registry: RegisteredValidators,
    pruner: Pruner,
}

impl DbSlashingProtection {
    /// `db` serves decisions; `pruning_db` should sit on its own pool.
    pub fn new(db: Database, pruning_db: Database, batch_size: u64) -> Self {
        Self {
            registry: RegisteredValidators::new(db.clone()),
            pruner: Pruner::new(pruning_db, batch_size),
            db,
        }
    }

    pub fn registry(&self) -> &RegisteredValidators {
        &self.registry
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn pruning_database(&self) -> &Database {
        self.pruner.database()
    }

    async fn decide_block(
        &self,
        genesis_validators_root: Option<Root>,
        candidate: SignedBlock,
    ) -> SlashingProtectionResult<Decision> {
        let decision = self
            .db
            .in_transaction("may_sign_block", move |conn| {
                Box::pin(async move {
                    engine::decide_block(conn, genesis_validators_root, candidate).await
                })
            })
            .await?;

        match decision {
            Decision::Allow => {
                debug!(
                    validator_id = %candidate.validator_id,
                    slot = candidate.slot,
                    signing_root = %candidate.signing_root,
                    "Block signing permitted"
                );
                metrics::record_permitted(BLOCK);
            }
            Decision::Deny(reason) => {
                warn!(
                    validator_id = %candidate.validator_id,
                    slot = candidate.slot,
                    signing_root = %candidate.signing_root,
                    reason = %reason,
                    "Block signing prevented"
                );
                metrics::record_prevented(BLOCK, reason.as_str());
            }
        }
        Ok(decision)
    }

    async fn decide_attestation(
        &self,
        genesis_validators_root: Option<Root>,
        candidate: SignedAttestation,
    ) -> SlashingProtectionResult<Decision> {
        // Malformed input never reaches the store.
        let decision = if candidate.source_epoch > candidate.target_epoch {
            Decision::Deny(DenyReason::InvalidEpochOrder)
        } else {
            self.db
                .in_transaction("may_sign_attestation", move |conn| {
                    Box::pin(async move {
                        engine::decide_attestation(conn, genesis_validators_root, candidate).await
                    })
                })
                .await?
        };

        match decision {
            Decision::Allow => {
                debug!(
                    validator_id = %candidate.validator_id,
                    source_epoch = candidate.source_epoch,
                    target_epoch = candidate.target_epoch,
                    signing_root = %candidate.signing_root,
                    "Attestation signing permitted"
                );
                metrics::record_permitted(ATTESTATION);
            }
            Decision::Deny(reason) => {
                warn!(
                    validator_id = %candidate.validator_id,
                    source_epoch = candidate.source_epoch,
                    target_epoch = candidate.target_epoch,
                    signing_root = %candidate.signing_root,
                    reason = %reason,
                    "Attestation signing prevented"
                );
                metrics::record_prevented(ATTESTATION, reason.as_str());
            }
        }
        Ok(decision)
    }
}

#[async_trait]
impl SlashingProtection for DbSlashingProtection {
    async fn resolve_validator(
        &self,
        public_key: &BlsPublicKey,
    ) -> SlashingProtectionResult<ValidatorId> {
        self.registry.resolve_or_register(public_key).await
    }

    async fn register_validators(
        &self,
        public_keys: &[BlsPublicKey],
    ) -> SlashingProtectionResult<Vec<ValidatorId>> {
        self.registry.register_validators(public_keys).await
    }

    async fn validator_id(
        &self,
        public_key: &BlsPublicKey,
    ) -> SlashingProtectionResult<Option<ValidatorId>> {
        self.registry.validator_id(public_key).await
    }

    async fn check_genesis(&self, root: Root) -> SlashingProtectionResult<bool> {
        self.db
            .in_transaction("check_genesis", move |conn| {
                Box::pin(async move { genesis::check_and_seed(conn, root).await })
            })
            .await
    }

    async fn genesis_root_exists(&self) -> SlashingProtectionResult<bool> {
        self.db
            .in_transaction("genesis_root_exists", |conn| {
                Box::pin(async move { genesis::root_exists(conn).await })
            })
            .await
    }

    async fn may_sign_block(
        &self,
        validator_id: ValidatorId,
        slot: Slot,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision> {
        self.decide_block(
            None,
            SignedBlock {
                validator_id,
                slot,
                signing_root,
            },
        )
        .await
    }

    async fn may_sign_attestation(
        &self,
        validator_id: ValidatorId,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision> {
        self.decide_attestation(
            None,
            SignedAttestation {
                validator_id,
                source_epoch,
                target_epoch,
                signing_root,
            },
        )
        .await
    }

    async fn may_sign_block_on_chain(
        &self,
        genesis_validators_root: Root,
        validator_id: ValidatorId,
        slot: Slot,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision> {
        self.decide_block(
            Some(genesis_validators_root),
            SignedBlock {
                validator_id,
                slot,
                signing_root,
            },
        )
        .await
    }

    async fn may_sign_attestation_on_chain(
        &self,
        genesis_validators_root: Root,
        validator_id: ValidatorId,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision> {
        self.decide_attestation(
            Some(genesis_validators_root),
            SignedAttestation {
                validator_id,
                source_epoch,
                target_epoch,
                signing_root,
            },
        )
        .await
    }

    async fn prune(
        &self,
        validator_id: ValidatorId,
        epochs_to_keep: u64,
        slots_per_epoch: u64,
    ) -> SlashingProtectionResult<PruneSummary> {
        self.pruner
            .prune(validator_id, RetentionPolicy::new(epochs_to_keep, slots_per_epoch))
            .await
    }

    async fn prune_all(
        &self,
        epochs_to_keep: u64,
        slots_per_epoch: u64,
    ) -> SlashingProtectionResult<PruneSummary> {
        let ids = self.registry.all_ids().await?;
        self.pruner
            .prune_all(&ids, RetentionPolicy::new(epochs_to_keep, slots_per_epoch))
            .await
    }
}
