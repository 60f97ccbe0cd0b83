use crate::config::SignerConfig;
use crate::handlers::SigningHandler;
use crate::pruning::spawn_pruning;
use anyhow::{Context, Result};
use rs_01_slashing_protection::adapters::db;
use rs_01_slashing_protection::{migrate, SlashingProtection, SlashingProtectionContext};
use rs_02_signing::{ArtifactSignerFactory, SignerProvider};
use signer_telemetry::set_loaded_keys;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running signer: loaded keys, slashing protection and background tasks.
pub struct SignerRuntime {
    handler: Arc<SigningHandler>,
    context: Option<SlashingProtectionContext>,
    pruning_task: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl SignerRuntime {
    /// Start with keys loaded from `config.keys.path`.
    pub async fn start(config: SignerConfig) -> Result<Self> {
        let factory = ArtifactSignerFactory::local();
        let signers = SignerProvider::load_dir(&config.keys.path, &factory)
            .await
            .with_context(|| {
                format!("Failed to load signing keys from {}", config.keys.path.display())
            })?;
        Self::start_with_signers(config, Arc::new(signers)).await
    }

    /// Start with an already populated signer provider.
    pub async fn start_with_signers(
        config: SignerConfig,
        signers: Arc<SignerProvider>,
    ) -> Result<Self> {
        info!("===========================================");
        info!("  Remote signer starting");
        info!("===========================================");
        set_loaded_keys(signers.len());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        if !config.protection.enabled {
            return Ok(Self {
                handler: Arc::new(SigningHandler::unprotected(signers)),
                context: None,
                pruning_task: None,
                shutdown_tx,
            });
        }

        let params = config.slashing_protection_parameters();

        if config.database.auto_migrate {
            let pool = db::connect(&params.db, 1).await?;
            migrate(&pool)
                .await
                .context("Failed to migrate slashing protection database")?;
            pool.close().await;
            info!(url = %params.db.url, "Slashing protection schema installed");
        }

        let context = SlashingProtectionContext::create(&params)
            .await
            .context("Failed to open slashing protection")?;
        let protection: Arc<dyn SlashingProtection> = context.slashing_protection();

        let public_keys = signers.public_keys();
        protection
            .register_validators(&public_keys)
            .await
            .context("Failed to register validators")?;
        info!(validators = public_keys.len(), "Registered validators");

        let pruning_task = spawn_pruning(
            Arc::clone(&protection),
            context.pruning().clone(),
            shutdown_rx,
        );

        Ok(Self {
            handler: Arc::new(SigningHandler::new(signers, protection)),
            context: Some(context),
            pruning_task,
            shutdown_tx,
        })
    }

    pub fn handler(&self) -> Arc<SigningHandler> {
        Arc::clone(&self.handler)
    }

    /// Stop background tasks and close the database pools.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        if let Some(task) = self.pruning_task {
            if let Err(e) = task.await {
                error!("Pruning task ended abnormally: {}", e);
            }
        }
        if let Some(context) = self.context {
            context.close().await;
        }

        info!("Shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs_01_slashing_protection::test_utils::migrate_at;
    use rs_01_slashing_protection::DenyReason;
    use rs_02_signing::{BlsArtifactSigner, BlsKeyPair};
    use shared_types::Root;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir, vars: &[(&str, &str)]) -> SignerConfig {
        let url = format!("sqlite://{}", dir.path().join("sp.db").display());
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert("SIGNER_DB_URL".to_string(), url);
        SignerConfig::from_lookup(move |key| map.get(key).cloned()).unwrap()
    }

    fn signers() -> Arc<SignerProvider> {
        let provider = SignerProvider::new();
        let keypair = BlsKeyPair::from_ikm(&[5u8; 32]).unwrap();
        provider.add(Arc::new(BlsArtifactSigner::new(keypair))).unwrap();
        Arc::new(provider)
    }

    #[tokio::test]
    async fn test_auto_migrate_then_protected_signing() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, &[("SIGNER_DB_AUTO_MIGRATE", "true")]);
        let signers = signers();
        let pk = signers.public_keys()[0];

        let runtime = SignerRuntime::start_with_signers(config, signers).await.unwrap();
        let handler = runtime.handler();
        assert!(handler.is_protected());

        let gvr = Root([1u8; 32]);
        handler.sign_block(&pk, gvr, 5, Root([1u8; 32])).await.unwrap();
        let second = handler.sign_block(&pk, gvr, 5, Root([2u8; 32])).await.unwrap();
        assert_eq!(
            second,
            crate::SigningOutcome::Refused(DenyReason::DoubleBlockProposal)
        );

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_unmigrated_database_is_fatal() {
        let dir = TempDir::new().unwrap();
        // The file exists but has no schema.
        std::fs::write(dir.path().join("sp.db"), b"").unwrap();
        let config = config_for(&dir, &[]);

        assert!(SignerRuntime::start_with_signers(config, signers()).await.is_err());
    }

    #[tokio::test]
    async fn test_restart_over_migrated_database() {
        let dir = TempDir::new().unwrap();
        migrate_at(&dir.path().join("sp.db")).await.unwrap();

        let runtime = SignerRuntime::start_with_signers(config_for(&dir, &[]), signers())
            .await
            .unwrap();
        runtime.shutdown().await;

        let runtime = SignerRuntime::start_with_signers(config_for(&dir, &[]), signers())
            .await
            .unwrap();
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_disabled_protection_needs_no_database() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, &[("SIGNER_SLASHING_PROTECTION_ENABLED", "false")]);

        let runtime = SignerRuntime::start_with_signers(config, signers()).await.unwrap();
        assert!(!runtime.handler().is_protected());
        assert!(!dir.path().join("sp.db").exists());
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_pruning_task_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let config = config_for(
            &dir,
            &[("SIGNER_DB_AUTO_MIGRATE", "true"), ("SIGNER_PRUNING_ENABLED", "true")],
        );

        let runtime = SignerRuntime::start_with_signers(config, signers()).await.unwrap();
        assert!(runtime.pruning_task.is_some());
        runtime.shutdown().await;
    }
}
