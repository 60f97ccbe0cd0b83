//! # Slashing Rules (Signing Commandments)
//!
//! Pure evaluation of a candidate against what the store already holds.
//! No I/O happens here; the engine gathers the relevant rows inside its
//! transaction and hands them over.
//!
//! ## The Commandments
//!
//! 1. No Double Proposal: one block root per slot
//! 2. No Double Vote: one attestation root per target epoch
//! 3. No Surround Vote: never sign S->T if S'->T' is recorded with S'<S and T<T'
//!    (or the reverse)
//! 4. Nothing below the low watermark

use crate::domain::types::{DenyReason, LowWatermark, SignedAttestation, SignedBlock};

/// Verdict for a block candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockVerdict {
    /// Safe and new: record it.
    Record,
    /// Exact same block already recorded; sign again without a new row.
    AlreadySigned,
    Refuse(DenyReason),
}

/// Verdict for an attestation candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttestationVerdict {
    Record,
    AlreadySigned,
    Refuse(DenyReason),
}

/// Recorded attestations relevant to one candidate.
#[derive(Clone, Debug, Default)]
pub struct AttestationHistory {
    /// Rows sharing the candidate's target epoch.
    pub same_target: Vec<SignedAttestation>,
    /// A row enclosing the candidate, if any.
    pub enclosing: Option<SignedAttestation>,
    /// A row enclosed by the candidate, if any.
    pub enclosed: Option<SignedAttestation>,
}

/// Check a block proposal.
pub fn check_block(
    candidate: &SignedBlock,
    watermark: Option<&LowWatermark>,
    existing: Option<&SignedBlock>,
) -> BlockVerdict {
    if watermark.is_some_and(|wm| wm.blocks_slot(candidate.slot)) {
        return BlockVerdict::Refuse(DenyReason::BelowWatermark);
    }

    match existing {
        None => BlockVerdict::Record,
        Some(prior) if prior.signing_root == candidate.signing_root => BlockVerdict::AlreadySigned,
        Some(_) => BlockVerdict::Refuse(DenyReason::DoubleBlockProposal),
    }
}

/// Check an attestation.
pub fn check_attestation(
    candidate: &SignedAttestation,
    watermark: Option<&LowWatermark>,
    history: &AttestationHistory,
) -> AttestationVerdict {
    if candidate.source_epoch > candidate.target_epoch {
        return AttestationVerdict::Refuse(DenyReason::InvalidEpochOrder);
    }

    if watermark
        .is_some_and(|wm| wm.blocks_attestation(candidate.source_epoch, candidate.target_epoch))
    {
        return AttestationVerdict::Refuse(DenyReason::BelowWatermark);
    }

    let same_target = history
        .same_target
        .iter()
        .filter(|prior| prior.target_epoch == candidate.target_epoch);

    let mut repeat = false;
    for prior in same_target {
        if prior.signing_root != candidate.signing_root {
            return AttestationVerdict::Refuse(DenyReason::DoubleVote);
        }
        repeat = true;
    }

    if history
        .enclosing
        .is_some_and(|prior| prior.surrounds(candidate))
    {
        return AttestationVerdict::Refuse(DenyReason::SurroundedVote);
    }

    if history
        .enclosed
        .is_some_and(|prior| candidate.surrounds(&prior))
    {
        return AttestationVerdict::Refuse(DenyReason::SurroundingVote);
    }

    if repeat {
        AttestationVerdict::AlreadySigned
    } else {
        AttestationVerdict::Record
    }
}
