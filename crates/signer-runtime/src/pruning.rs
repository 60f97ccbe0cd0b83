//! Scheduled slashing protection pruning.
//!
//! One background task calls `prune_all` every `interval`, and once right
//! away when `at_boot` is set. A failed run is logged and the next tick
//! tries again.

use rs_01_slashing_protection::{PruningParameters, SlashingProtection};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Spawn the pruning task, or return `None` when pruning is disabled.
pub fn spawn_pruning(
    protection: Arc<dyn SlashingProtection>,
    params: PruningParameters,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if !params.enabled {
        return None;
    }

    let start = if params.at_boot {
        Instant::now()
    } else {
        Instant::now() + params.interval
    };

    info!(
        epochs_to_keep = params.epochs_to_keep,
        slots_per_epoch = params.slots_per_epoch,
        interval_secs = params.interval.as_secs(),
        at_boot = params.at_boot,
        "Scheduling slashing protection pruning"
    );

    Some(tokio::spawn(async move {
        let mut ticker = interval_at(start, params.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_once(protection.as_ref(), &params).await;
                }
                _ = shutdown.changed() => {
                    info!("[pruning] Shutdown signal received");
                    break;
                }
            }
        }
    }))
}

async fn run_once(protection: &dyn SlashingProtection, params: &PruningParameters) {
    match protection
        .prune_all(params.epochs_to_keep, params.slots_per_epoch)
        .await
    {
        Ok(summary) => info!(
            deleted_blocks = summary.deleted_blocks,
            deleted_attestations = summary.deleted_attestations,
            "Scheduled pruning finished"
        ),
        Err(err) => error!(error = %err, "Scheduled pruning failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs_01_slashing_protection::test_utils::{make_public_key, make_root, migrated_context};
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disabled_pruning_spawns_nothing() {
        let dir = TempDir::new().unwrap();
        let context = migrated_context(&dir.path().join("sp.db")).await.unwrap();
        let (_tx, rx) = watch::channel(false);

        let handle = spawn_pruning(context.slashing_protection(), PruningParameters::default(), rx);
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_prune_at_boot_then_shutdown() {
        let dir = TempDir::new().unwrap();
        let context = migrated_context(&dir.path().join("sp.db")).await.unwrap();
        let protection = context.slashing_protection();

        let id = protection.resolve_validator(&make_public_key(1)).await.unwrap();
        for slot in 0..10u64 {
            let decision = protection
                .may_sign_block(id, slot, make_root(slot as u8))
                .await
                .unwrap();
            assert!(decision.is_allowed());
        }

        let params = PruningParameters {
            enabled: true,
            epochs_to_keep: 1,
            slots_per_epoch: 2,
            interval: Duration::from_secs(3600),
            at_boot: true,
            ..PruningParameters::default()
        };
        let (tx, rx) = watch::channel(false);
        let handle = spawn_pruning(protection.clone(), params, rx).unwrap();

        // Floor is 9 - 2 = 7; slots below it become refusable.
        let mut refused = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if !protection.may_sign_block(id, 6, make_root(6)).await.unwrap().is_allowed() {
                refused = true;
                break;
            }
        }
        assert!(refused);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
