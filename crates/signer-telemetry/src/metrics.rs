//! Prometheus metrics for the signer process.
//!
//! Collectors are registered with the prometheus default registry, the same
//! one the slashing protection crate registers into, so a single
//! [`encode_metrics`] call exposes everything.
//!
//! - `signer_signing_requests_total` - Counter of signing requests (by artifact, outcome)
//! - `signer_loaded_keys` - Gauge of keys available for signing

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Signing requests by artifact and outcome (signed, refused, failed)
    pub static ref SIGNING_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "signer_signing_requests_total",
        "Total number of signing requests handled",
        &["artifact", "outcome"]
    )
    .expect("Failed to create SIGNING_REQUESTS metric");

    /// Keys available for signing
    pub static ref LOADED_KEYS: IntGauge = register_int_gauge!(
        "signer_loaded_keys",
        "Number of keys loaded for signing"
    )
    .expect("Failed to create LOADED_KEYS metric");
}

/// Record the outcome of one signing request
pub fn record_signing_request(artifact: &str, outcome: &str) {
    SIGNING_REQUESTS.with_label_values(&[artifact, outcome]).inc();
}

/// Update the loaded keys gauge
pub fn set_loaded_keys(count: usize) {
    LOADED_KEYS.set(count as i64);
}

/// Encode the default registry as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_output_contains_recorded_metrics() {
        record_signing_request("block", "signed");
        set_loaded_keys(3);

        let text = encode_metrics().unwrap();
        assert!(text.contains("signer_signing_requests_total"));
        assert!(text.contains("signer_loaded_keys 3"));
    }
}
