//! # Decision Engine
//!
//! Transaction bodies for block and attestation decisions. Each runs on the
//! connection of one transaction: read the watermark and the relevant
//! history, evaluate the rules, write the record on allow.
//!
//! ```text
//! [genesis] → watermark → history → rules ─┬─ Record ────→ insert → Allow
//!                                          ├─ AlreadySigned ──────→ Allow
//!                                          └─ Refuse(r) ──────────→ Deny(r)
//! ```

use crate::adapters::db::dao::{low_watermarks, signed_attestations, signed_blocks, InsertOutcome};
use crate::domain::{
    check_attestation, check_block, AttestationHistory, AttestationVerdict, BlockVerdict, Decision,
    DenyReason, SignedAttestation, SignedBlock,
};
use crate::error::StorageError;
use crate::service::genesis;
use shared_types::Root;
use sqlx::SqliteConnection;

pub async fn decide_block(
    conn: &mut SqliteConnection,
    genesis_validators_root: Option<Root>,
    candidate: SignedBlock,
) -> Result<Decision, StorageError> {
    if let Some(root) = genesis_validators_root {
        if !genesis::check_and_seed(conn, root).await? {
            return Ok(Decision::Deny(DenyReason::GenesisMismatch));
        }
    }

    let watermark = low_watermarks::find(conn, candidate.validator_id).await?;
    let existing = signed_blocks::find_at_slot(conn, candidate.validator_id, candidate.slot).await?;

    match check_block(&candidate, watermark.as_ref(), existing.as_ref()) {
        BlockVerdict::Record => match signed_blocks::insert(conn, &candidate).await? {
            InsertOutcome::Inserted => Ok(Decision::Allow),
            InsertOutcome::Conflict => Ok(Decision::Deny(DenyReason::DoubleBlockProposal)),
        },
        BlockVerdict::AlreadySigned => Ok(Decision::Allow),
        BlockVerdict::Refuse(reason) => Ok(Decision::Deny(reason)),
    }
}

pub async fn decide_attestation(
    conn: &mut SqliteConnection,
    genesis_validators_root: Option<Root>,
    candidate: SignedAttestation,
) -> Result<Decision, StorageError> {
    if let Some(root) = genesis_validators_root {
        if !genesis::check_and_seed(conn, root).await? {
            return Ok(Decision::Deny(DenyReason::GenesisMismatch));
        }
    }

    let id = candidate.validator_id;
    let (source, target) = (candidate.source_epoch, candidate.target_epoch);

    let watermark = low_watermarks::find(conn, id).await?;
    let history = AttestationHistory {
        same_target: signed_attestations::find_at_target(conn, id, target).await?,
        enclosing: signed_attestations::find_enclosing(conn, id, source, target).await?,
        enclosed: signed_attestations::find_enclosed(conn, id, source, target).await?,
    };

    match check_attestation(&candidate, watermark.as_ref(), &history) {
        AttestationVerdict::Record => match signed_attestations::insert(conn, &candidate).await? {
            InsertOutcome::Inserted => Ok(Decision::Allow),
            InsertOutcome::Conflict => Ok(Decision::Deny(DenyReason::DoubleVote)),
        },
        AttestationVerdict::AlreadySigned => Ok(Decision::Allow),
        AttestationVerdict::Refuse(reason) => Ok(Decision::Deny(reason)),
    }
}
