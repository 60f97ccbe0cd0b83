//! # Remote Signer
//!
//! Loads keys, opens slashing protection and waits for shutdown. Any fatal
//! startup error (bad configuration, unreachable database, wrong schema
//! version, missing required genesis root) exits non-zero before a single
//! request could be signed.

use anyhow::{Context, Result};
use signer_runtime::{SignerConfig, SignerRuntime};
use signer_telemetry::init_telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SignerConfig::from_env().context("Invalid signer configuration")?;
    init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    info!(
        service = %config.telemetry.service_name,
        keys = %config.keys.path.display(),
        "Loaded configuration"
    );

    let runtime = SignerRuntime::start(config).await?;

    info!("Signer is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
