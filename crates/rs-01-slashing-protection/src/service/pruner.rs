//! # Pruning Service
//!
//! Two phases per validator, on the pruning pool:
//!
//! 1. Raise the low watermark and commit it.
//! 2. Delete history below the committed watermark in batches of at most
//!    `batch_size` rows, one short transaction per batch.
//!
//! A crash between or during phase 2 leaves rows that the watermark already
//! refuses; it never leaves deleted evidence under a stale watermark.

use crate::adapters::db::dao::{low_watermarks, signed_attestations, signed_blocks};
use crate::adapters::db::Database;
use crate::domain::{LowWatermark, PruneSummary, RetentionPolicy, ValidatorId};
use crate::error::{SlashingProtectionResult, StorageError};
use crate::metrics;
use sqlx::SqliteConnection;
use tracing::{debug, info};

pub const DEFAULT_BATCH_SIZE: u64 = 10_000;

pub struct Pruner {
    db: Database,
    batch_size: u64,
}

impl Pruner {
    pub fn new(db: Database, batch_size: u64) -> Self {
        Self {
            db,
            batch_size: batch_size.max(1),
        }
    }

    /// Handle on the pruning pool.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn prune(
        &self,
        validator_id: ValidatorId,
        policy: RetentionPolicy,
    ) -> SlashingProtectionResult<PruneSummary> {
        let watermark = self
            .db
            .in_transaction("prune_watermark", move |conn| {
                Box::pin(async move { advance_watermark(conn, validator_id, policy).await })
            })
            .await?;

        let batch = self.batch_size;
        let mut summary = PruneSummary {
            watermark: Some(watermark),
            ..PruneSummary::default()
        };

        loop {
            let deleted = self
                .db
                .in_transaction("prune_blocks", move |conn| {
                    Box::pin(async move {
                        signed_blocks::delete_below(conn, validator_id, watermark.slot, batch).await
                    })
                })
                .await?;
            summary.deleted_blocks += deleted;
            if deleted < batch {
                break;
            }
        }

        loop {
            let deleted = self
                .db
                .in_transaction("prune_attestations", move |conn| {
                    Box::pin(async move {
                        signed_attestations::delete_below(
                            conn,
                            validator_id,
                            watermark.target_epoch,
                            batch,
                        )
                        .await
                    })
                })
                .await?;
            summary.deleted_attestations += deleted;
            if deleted < batch {
                break;
            }
        }

        metrics::record_pruned("signed_blocks", summary.deleted_blocks);
        metrics::record_pruned("signed_attestations", summary.deleted_attestations);
        debug!(
            validator_id = %validator_id,
            slot = watermark.slot,
            source_epoch = watermark.source_epoch,
            target_epoch = watermark.target_epoch,
            deleted_blocks = summary.deleted_blocks,
            deleted_attestations = summary.deleted_attestations,
            "Pruned validator history"
        );
        Ok(summary)
    }

    /// Prune each of `validator_ids` in turn.
    ///
    /// The returned summary carries totals; its `watermark` is `None`.
    pub async fn prune_all(
        &self,
        validator_ids: &[ValidatorId],
        policy: RetentionPolicy,
    ) -> SlashingProtectionResult<PruneSummary> {
        let mut total = PruneSummary::default();
        for id in validator_ids {
            let summary = self.prune(*id, policy).await?;
            total.merge(&summary);
        }

        info!(
            validators = validator_ids.len(),
            deleted_blocks = total.deleted_blocks,
            deleted_attestations = total.deleted_attestations,
            "Slashing protection pruning complete"
        );
        Ok(total)
    }
}

/// Compute the retention floors from recorded history and raise the stored
/// watermark to them. Returns the watermark now in force.
async fn advance_watermark(
    conn: &mut SqliteConnection,
    validator_id: ValidatorId,
    policy: RetentionPolicy,
) -> Result<LowWatermark, StorageError> {
    let current = low_watermarks::find(conn, validator_id)
        .await?
        .unwrap_or_else(|| LowWatermark::floor(validator_id));
    let mut proposed = current;

    if let Some(max_slot) = signed_blocks::max_slot(conn, validator_id).await? {
        let floor = policy.block_floor(max_slot);
        if let Some(slot) = signed_blocks::min_slot_at_or_above(conn, validator_id, floor).await? {
            proposed.slot = slot;
        }
    }

    if let Some(max_target) = signed_attestations::max_target_epoch(conn, validator_id).await? {
        let floor = policy.attestation_floor(max_target);
        if let Some((source, target)) =
            signed_attestations::lowest_at_or_above(conn, validator_id, floor).await?
        {
            proposed.source_epoch = source;
            proposed.target_epoch = target;
        }
    }

    let next = current.raise(&proposed);
    if next != current {
        low_watermarks::raise(conn, &next).await?;
    }
    Ok(next)
}
