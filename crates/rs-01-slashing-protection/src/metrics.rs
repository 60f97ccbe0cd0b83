//! # Slashing Protection Metrics
//!
//! Prometheus metrics for signing decisions and pruning.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! rs-01-slashing-protection = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `slashing_protection_permitted_total` - Counter of permitted signings (by artifact)
//! - `slashing_protection_prevented_total` - Counter of refused signings (by artifact, reason)
//! - `slashing_protection_retries_total` - Counter of retried transactions (by operation)
//! - `slashing_protection_pruned_records_total` - Counter of pruned rows (by table)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Permitted signings, labeled by artifact
    pub static ref PERMITTED: IntCounterVec = register_int_counter_vec!(
        "slashing_protection_permitted_total",
        "Total number of signings permitted by slashing protection",
        &["artifact"]
    )
    .expect("Failed to create PERMITTED metric");

    /// Refused signings, labeled by artifact and reason
    pub static ref PREVENTED: IntCounterVec = register_int_counter_vec!(
        "slashing_protection_prevented_total",
        "Total number of signings prevented by slashing protection",
        &["artifact", "reason"]
    )
    .expect("Failed to create PREVENTED metric");

    /// Retried transactions, labeled by operation
    pub static ref RETRIES: IntCounterVec = register_int_counter_vec!(
        "slashing_protection_retries_total",
        "Total number of retried slashing protection transactions",
        &["operation"]
    )
    .expect("Failed to create RETRIES metric");

    /// Pruned rows, labeled by table
    pub static ref PRUNED_RECORDS: IntCounterVec = register_int_counter_vec!(
        "slashing_protection_pruned_records_total",
        "Total number of historical rows deleted by pruning",
        &["table"]
    )
    .expect("Failed to create PRUNED_RECORDS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a permitted signing
#[cfg(feature = "metrics")]
pub fn record_permitted(artifact: &str) {
    PERMITTED.with_label_values(&[artifact]).inc();
}

/// Record a prevented signing with reason
#[cfg(feature = "metrics")]
pub fn record_prevented(artifact: &str, reason: &str) {
    PREVENTED.with_label_values(&[artifact, reason]).inc();
}

/// Record a transaction retry
#[cfg(feature = "metrics")]
pub fn record_retry(operation: &str) {
    RETRIES.with_label_values(&[operation]).inc();
}

/// Record rows deleted from a table
#[cfg(feature = "metrics")]
pub fn record_pruned(table: &str, count: u64) {
    PRUNED_RECORDS.with_label_values(&[table]).inc_by(count);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_permitted(_artifact: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_prevented(_artifact: &str, _reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_retry(_operation: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_pruned(_table: &str, _count: u64) {}
