//! # Retention Floors
//!
//! Pure arithmetic for how far back pruning may cut. The store turns these
//! floors into concrete watermark values by looking up the lowest recorded
//! row at or above each floor.

use shared_types::{Epoch, Slot};

/// Retention window for one prune run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub epochs_to_keep: u64,
    pub slots_per_epoch: u64,
}

impl RetentionPolicy {
    pub fn new(epochs_to_keep: u64, slots_per_epoch: u64) -> Self {
        Self {
            epochs_to_keep,
            slots_per_epoch,
        }
    }

    /// Lowest slot still retained given the highest recorded slot.
    pub fn block_floor(&self, max_slot: Slot) -> Slot {
        max_slot.saturating_sub(self.epochs_to_keep.saturating_mul(self.slots_per_epoch))
    }

    /// Lowest target epoch still retained given the highest recorded target.
    pub fn attestation_floor(&self, max_target_epoch: Epoch) -> Epoch {
        max_target_epoch.saturating_sub(self.epochs_to_keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_floor_uses_slots_per_epoch() {
        let policy = RetentionPolicy::new(2, 32);
        assert_eq!(policy.block_floor(1000), 936);
    }

    #[test]
    fn test_floors_saturate_at_zero() {
        let policy = RetentionPolicy::new(250, 32);
        assert_eq!(policy.block_floor(100), 0);
        assert_eq!(policy.attestation_floor(100), 0);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let policy = RetentionPolicy::new(u64::MAX, u64::MAX);
        assert_eq!(policy.block_floor(u64::MAX), 0);
    }

    #[test]
    fn test_attestation_floor() {
        let policy = RetentionPolicy::new(5, 32);
        assert_eq!(policy.attestation_floor(20), 15);
    }
}
