//! Domain layer for slashing protection.
//!
//! Pure entities and rule evaluation. Nothing in here touches the database.

pub mod pruning;
pub mod rules;
pub mod types;

pub use pruning::RetentionPolicy;
pub use rules::{
    check_attestation, check_block, AttestationHistory, AttestationVerdict, BlockVerdict,
};
pub use types::{
    Decision, DenyReason, LowWatermark, PruneSummary, SignedAttestation, SignedBlock, ValidatorId,
};
