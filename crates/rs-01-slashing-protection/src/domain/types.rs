//! # Slashing Protection Entities
//!
//! Rows of the historical record and the verdicts computed from them.

use shared_types::{Epoch, Root, Slot};
use std::fmt;

/// Stable internal identifier of a registered validator key.
///
/// Historical rows reference this id, never the raw public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidatorId(pub i64);

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A block proposal that was permitted and recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedBlock {
    pub validator_id: ValidatorId,
    pub slot: Slot,
    pub signing_root: Root,
}

/// An attestation that was permitted and recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedAttestation {
    pub validator_id: ValidatorId,
    pub source_epoch: Epoch,
    pub target_epoch: Epoch,
    pub signing_root: Root,
}

impl SignedAttestation {
    /// Strict containment: `self.source < other.source` and `other.target < self.target`.
    pub fn surrounds(&self, other: &SignedAttestation) -> bool {
        self.source_epoch < other.source_epoch && other.target_epoch < self.target_epoch
    }

    /// Same target epoch and same signing root.
    pub fn is_repeat_of(&self, other: &SignedAttestation) -> bool {
        self.target_epoch == other.target_epoch && self.signing_root == other.signing_root
    }
}

/// Per-validator floor below which every request is refused.
///
/// Only pruning moves it, and only upwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LowWatermark {
    pub validator_id: ValidatorId,
    pub slot: Slot,
    pub source_epoch: Epoch,
    pub target_epoch: Epoch,
}

impl LowWatermark {
    /// Watermark that refuses nothing.
    pub fn floor(validator_id: ValidatorId) -> Self {
        Self {
            validator_id,
            slot: 0,
            source_epoch: 0,
            target_epoch: 0,
        }
    }

    /// Component-wise maximum of `self` and `other`.
    pub fn raise(&self, other: &LowWatermark) -> LowWatermark {
        LowWatermark {
            validator_id: self.validator_id,
            slot: self.slot.max(other.slot),
            source_epoch: self.source_epoch.max(other.source_epoch),
            target_epoch: self.target_epoch.max(other.target_epoch),
        }
    }

    pub fn blocks_slot(&self, slot: Slot) -> bool {
        slot < self.slot
    }

    pub fn blocks_attestation(&self, source_epoch: Epoch, target_epoch: Epoch) -> bool {
        target_epoch < self.target_epoch || source_epoch < self.source_epoch
    }
}

/// Why a request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// Another block with a different root is already recorded for the slot.
    DoubleBlockProposal,
    /// Another attestation with a different root is recorded for the target epoch.
    DoubleVote,
    /// The candidate would enclose a recorded attestation.
    SurroundingVote,
    /// The candidate is enclosed by a recorded attestation.
    SurroundedVote,
    /// The candidate lies below the validator's low watermark.
    BelowWatermark,
    /// Source epoch is greater than target epoch.
    InvalidEpochOrder,
    /// Genesis validators root differs from the one bound to this database.
    GenesisMismatch,
}

impl DenyReason {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoubleBlockProposal => "DOUBLE_BLOCK_PROPOSAL",
            Self::DoubleVote => "DOUBLE_VOTE",
            Self::SurroundingVote => "SURROUNDING_VOTE",
            Self::SurroundedVote => "SURROUNDED_VOTE",
            Self::BelowWatermark => "BELOW_WATERMARK",
            Self::InvalidEpochOrder => "INVALID_EPOCH_ORDER",
            Self::GenesisMismatch => "GENESIS_MISMATCH",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a slashing check.
///
/// A refusal is a normal result, not an error.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// What a prune run removed, and the watermark it left behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub deleted_blocks: u64,
    pub deleted_attestations: u64,
    pub watermark: Option<LowWatermark>,
}

impl PruneSummary {
    pub fn merge(&mut self, other: &PruneSummary) {
        self.deleted_blocks += other.deleted_blocks;
        self.deleted_attestations += other.deleted_attestations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: ValidatorId = ValidatorId(1);

    fn attestation(source: u64, target: u64) -> SignedAttestation {
        SignedAttestation {
            validator_id: V,
            source_epoch: source,
            target_epoch: target,
            signing_root: Root::ZERO,
        }
    }

    #[test]
    fn test_surround_is_strict() {
        assert!(attestation(1, 4).surrounds(&attestation(2, 3)));
        assert!(!attestation(2, 4).surrounds(&attestation(2, 3)));
        assert!(!attestation(1, 3).surrounds(&attestation(2, 3)));
        assert!(!attestation(2, 3).surrounds(&attestation(1, 4)));
    }

    #[test]
    fn test_raise_never_lowers() {
        let current = LowWatermark {
            validator_id: V,
            slot: 100,
            source_epoch: 2,
            target_epoch: 3,
        };
        let lower = LowWatermark {
            validator_id: V,
            slot: 50,
            source_epoch: 5,
            target_epoch: 1,
        };
        let raised = current.raise(&lower);
        assert_eq!(raised.slot, 100);
        assert_eq!(raised.source_epoch, 5);
        assert_eq!(raised.target_epoch, 3);
    }

    #[test]
    fn test_watermark_bounds() {
        let wm = LowWatermark {
            validator_id: V,
            slot: 10,
            source_epoch: 4,
            target_epoch: 15,
        };
        assert!(wm.blocks_slot(9));
        assert!(!wm.blocks_slot(10));
        assert!(wm.blocks_attestation(5, 14));
        assert!(wm.blocks_attestation(3, 20));
        assert!(!wm.blocks_attestation(4, 15));
    }

    #[test]
    fn test_deny_reason_labels() {
        assert_eq!(DenyReason::DoubleBlockProposal.to_string(), "DOUBLE_BLOCK_PROPOSAL");
        assert_eq!(
            Decision::Deny(DenyReason::DoubleVote).deny_reason(),
            Some(DenyReason::DoubleVote)
        );
        assert!(Decision::Allow.is_allowed());
    }
}
