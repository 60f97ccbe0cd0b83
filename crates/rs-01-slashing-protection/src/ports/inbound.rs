//! Driving Ports (API - Inbound)
//!
//! What the request-handling layer calls before signing anything.

use crate::domain::{Decision, PruneSummary, ValidatorId};
use crate::error::SlashingProtectionResult;
use async_trait::async_trait;
use shared_types::{BlsPublicKey, Epoch, Root, Slot};

/// Primary Slashing Protection API
///
/// An `Err` always means "could not check". Callers must refuse to sign on
/// `Err` exactly as on `Decision::Deny`.
#[async_trait]
pub trait SlashingProtection: Send + Sync {
    /// Map a public key to its stable id, registering it on first sight.
    async fn resolve_validator(
        &self,
        public_key: &BlsPublicKey,
    ) -> SlashingProtectionResult<ValidatorId>;

    /// Register many keys at once, returning ids in input order.
    async fn register_validators(
        &self,
        public_keys: &[BlsPublicKey],
    ) -> SlashingProtectionResult<Vec<ValidatorId>>;

    /// Look up a key without registering it.
    async fn validator_id(
        &self,
        public_key: &BlsPublicKey,
    ) -> SlashingProtectionResult<Option<ValidatorId>>;

    /// Seed the genesis validators root on first use, then compare against it.
    async fn check_genesis(&self, root: Root) -> SlashingProtectionResult<bool>;

    /// Whether a genesis validators root has been recorded.
    async fn genesis_root_exists(&self) -> SlashingProtectionResult<bool>;

    /// Decide a block proposal and record it when allowed.
    async fn may_sign_block(
        &self,
        validator_id: ValidatorId,
        slot: Slot,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision>;

    /// Decide an attestation and record it when allowed.
    async fn may_sign_attestation(
        &self,
        validator_id: ValidatorId,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision>;

    /// [`Self::may_sign_block`] with the genesis check in the same transaction.
    async fn may_sign_block_on_chain(
        &self,
        genesis_validators_root: Root,
        validator_id: ValidatorId,
        slot: Slot,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision>;

    /// [`Self::may_sign_attestation`] with the genesis check in the same transaction.
    async fn may_sign_attestation_on_chain(
        &self,
        genesis_validators_root: Root,
        validator_id: ValidatorId,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Root,
    ) -> SlashingProtectionResult<Decision>;

    /// Raise the validator's watermark and delete history below it.
    async fn prune(
        &self,
        validator_id: ValidatorId,
        epochs_to_keep: u64,
        slots_per_epoch: u64,
    ) -> SlashingProtectionResult<PruneSummary>;

    /// [`Self::prune`] for every registered validator.
    async fn prune_all(
        &self,
        epochs_to_keep: u64,
        slots_per_epoch: u64,
    ) -> SlashingProtectionResult<PruneSummary>;
}
