//! # Signer Provider
//!
//! Loaded signers keyed by public key.

use crate::adapters::key_config;
use crate::ports::ArtifactSigner;
use crate::error::{SigningError, SigningResult};
use crate::service::factory::ArtifactSignerFactory;
use parking_lot::RwLock;
use shared_types::BlsPublicKey;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
pub struct SignerProvider {
    signers: RwLock<HashMap<BlsPublicKey, Arc<dyn ArtifactSigner>>>,
}

impl SignerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every metadata file in `dir` through `factory`.
    pub async fn load_dir(dir: &Path, factory: &ArtifactSignerFactory) -> SigningResult<Self> {
        let provider = Self::new();
        for (_path, metadata) in key_config::load_metadata_dir(dir)? {
            let signer = factory.create(&metadata).await?;
            provider.add(signer)?;
        }
        info!(dir = %dir.display(), keys = provider.len(), "Loaded signing keys");
        Ok(provider)
    }

    pub fn add(&self, signer: Arc<dyn ArtifactSigner>) -> SigningResult<()> {
        let public_key = signer.identifier();
        let mut signers = self.signers.write();
        if signers.contains_key(&public_key) {
            return Err(SigningError::DuplicateKey {
                public_key: public_key.to_string(),
            });
        }
        signers.insert(public_key, signer);
        Ok(())
    }

    pub fn get(&self, public_key: &BlsPublicKey) -> Option<Arc<dyn ArtifactSigner>> {
        self.signers.read().get(public_key).cloned()
    }

    /// Public keys, sorted.
    pub fn public_keys(&self) -> Vec<BlsPublicKey> {
        let mut keys: Vec<BlsPublicKey> = self.signers.read().keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.signers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
