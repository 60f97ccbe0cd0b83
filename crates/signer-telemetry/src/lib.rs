//! # Signer Telemetry
//!
//! Logging and metrics bootstrap for the remote signer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signer_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // tracing macros now reach stdout, metrics are exposed by encode_metrics()
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIGNER_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `SIGNER_JSON_LOGS` | `false` | JSON log lines |
//! | `SIGNER_SERVICE_NAME` | `remote-signer` | Service name in startup logs |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{encode_metrics, record_signing_request, set_loaded_keys};
pub use tracing_setup::{env_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to encode Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging. Metrics need no setup: collectors self-register on first use.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}
