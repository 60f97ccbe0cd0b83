//! # Artifact Signer Factory
//!
//! One constructor per metadata variant. Each ends in the same place: a
//! [`BlsKeyPair`] behind `Arc<dyn ArtifactSigner>`.

use crate::domain::{BlsKeyPair, SigningMetadata};
use crate::error::{SigningError, SigningResult};
use crate::ports::{ArtifactSigner, SecretFetcher, SecretRequest};
use shared_types::{BlsPublicKey, BlsSignature};
use std::sync::Arc;
use tracing::debug;

/// Local BLS signer.
pub struct BlsArtifactSigner {
    keypair: BlsKeyPair,
}

impl BlsArtifactSigner {
    pub fn new(keypair: BlsKeyPair) -> Self {
        Self { keypair }
    }
}

impl ArtifactSigner for BlsArtifactSigner {
    fn identifier(&self) -> BlsPublicKey {
        self.keypair.public_key()
    }

    fn sign(&self, message: &[u8]) -> BlsSignature {
        self.keypair.sign(message)
    }
}

#[derive(Default)]
pub struct ArtifactSignerFactory {
    fetcher: Option<Arc<dyn SecretFetcher>>,
}

impl ArtifactSignerFactory {
    /// Factory for inline keys only.
    pub fn local() -> Self {
        Self { fetcher: None }
    }

    pub fn with_fetcher(fetcher: Arc<dyn SecretFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
        }
    }

    pub async fn create(
        &self,
        metadata: &SigningMetadata,
    ) -> SigningResult<Arc<dyn ArtifactSigner>> {
        let signer = match metadata {
            SigningMetadata::FileRaw { private_key } => self.create_file_raw(private_key)?,
            SigningMetadata::AwsSecrets {
                region,
                secret_name,
            } => self.create_aws_secrets(region, secret_name).await?,
            SigningMetadata::FortanixDsm {
                server,
                api_key,
                secret_name,
            } => self.create_fortanix_dsm(server, api_key, secret_name).await?,
            SigningMetadata::YubiHsm {
                connector_url,
                auth_id,
                opaque_data_id,
            } => {
                self.create_yubihsm(connector_url, *auth_id, *opaque_data_id)
                    .await?
            }
        };

        debug!(
            backend = metadata.backend(),
            public_key = %signer.identifier(),
            "Created artifact signer"
        );
        Ok(signer)
    }

    pub fn create_file_raw(&self, private_key: &str) -> SigningResult<Arc<dyn ArtifactSigner>> {
        let keypair = BlsKeyPair::from_secret_hex(private_key)?;
        Ok(Arc::new(BlsArtifactSigner::new(keypair)))
    }

    pub async fn create_aws_secrets(
        &self,
        region: &str,
        secret_name: &str,
    ) -> SigningResult<Arc<dyn ArtifactSigner>> {
        let request = SecretRequest::AwsSecretsManager {
            region: region.to_string(),
            secret_name: secret_name.to_string(),
        };
        self.create_remote("aws-secrets", &request).await
    }

    pub async fn create_fortanix_dsm(
        &self,
        server: &str,
        api_key: &str,
        secret_name: &str,
    ) -> SigningResult<Arc<dyn ArtifactSigner>> {
        let request = SecretRequest::FortanixDsm {
            server: server.to_string(),
            api_key: api_key.to_string(),
            secret_name: secret_name.to_string(),
        };
        self.create_remote("fortanix-dsm", &request).await
    }

    pub async fn create_yubihsm(
        &self,
        connector_url: &str,
        auth_id: u16,
        opaque_data_id: u16,
    ) -> SigningResult<Arc<dyn ArtifactSigner>> {
        let request = SecretRequest::YubiHsmOpaque {
            connector_url: connector_url.to_string(),
            auth_id,
            opaque_data_id,
        };
        self.create_remote("yubihsm", &request).await
    }

    async fn create_remote(
        &self,
        backend: &'static str,
        request: &SecretRequest,
    ) -> SigningResult<Arc<dyn ArtifactSigner>> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or(SigningError::BackendUnavailable { backend })?;
        let secret = fetcher.fetch(request).await?;
        let keypair = BlsKeyPair::from_secret_hex(&secret)?;
        Ok(Arc::new(BlsArtifactSigner::new(keypair)))
    }
}
