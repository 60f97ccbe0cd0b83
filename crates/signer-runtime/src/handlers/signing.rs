//! # Protected Signing Handler
//!
//! What the request layer calls. Slashable artifacts go through slashing
//! protection first and are signed only on `Allow`:
//!
//! ```text
//! key lookup → resolve validator → may_sign_*_on_chain ─┬─ Allow ──→ sign → Signed
//!                                                        ├─ Deny(r) ────────→ Refused(r)
//!                                                        └─ Err ────────────→ HandlerError
//! ```

use rs_01_slashing_protection::{Decision, DenyReason, SlashingProtection, SlashingProtectionError};
use rs_02_signing::{ArtifactSigner, SignerProvider};
use shared_types::{BlsPublicKey, BlsSignature, Epoch, Root, Slot};
use signer_telemetry::record_signing_request;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Result of a signing request that could be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningOutcome {
    Signed(BlsSignature),
    Refused(DenyReason),
}

impl SigningOutcome {
    pub fn signature(&self) -> Option<BlsSignature> {
        match self {
            SigningOutcome::Signed(signature) => Some(*signature),
            SigningOutcome::Refused(_) => None,
        }
    }
}

/// A request that could not be evaluated. Never a refusal.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("No signing key loaded for {public_key}")]
    UnknownKey { public_key: BlsPublicKey },

    #[error(transparent)]
    Protection(#[from] SlashingProtectionError),
}

pub struct SigningHandler {
    signers: Arc<SignerProvider>,
    protection: Option<Arc<dyn SlashingProtection>>,
}

impl SigningHandler {
    /// Handler that checks slashing protection before every block or attestation.
    pub fn new(signers: Arc<SignerProvider>, protection: Arc<dyn SlashingProtection>) -> Self {
        Self {
            signers,
            protection: Some(protection),
        }
    }

    /// Handler that signs without any slashing protection.
    pub fn unprotected(signers: Arc<SignerProvider>) -> Self {
        warn!("Slashing protection is disabled; blocks and attestations are signed unchecked");
        Self {
            signers,
            protection: None,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_some()
    }

    pub async fn sign_block(
        &self,
        public_key: &BlsPublicKey,
        genesis_validators_root: Root,
        slot: Slot,
        signing_root: Root,
    ) -> Result<SigningOutcome, HandlerError> {
        let signer = self.signer("block", public_key)?;

        let decision = match &self.protection {
            Some(protection) => {
                let checked = async {
                    let id = protection.resolve_validator(public_key).await?;
                    protection
                        .may_sign_block_on_chain(genesis_validators_root, id, slot, signing_root)
                        .await
                }
                .await;
                self.checked("block", public_key, checked)?
            }
            None => Decision::Allow,
        };

        Ok(self.finish("block", public_key, signer.as_ref(), decision, &signing_root))
    }

    pub async fn sign_attestation(
        &self,
        public_key: &BlsPublicKey,
        genesis_validators_root: Root,
        source_epoch: Epoch,
        target_epoch: Epoch,
        signing_root: Root,
    ) -> Result<SigningOutcome, HandlerError> {
        let signer = self.signer("attestation", public_key)?;

        let decision = match &self.protection {
            Some(protection) => {
                let checked = async {
                    let id = protection.resolve_validator(public_key).await?;
                    protection
                        .may_sign_attestation_on_chain(
                            genesis_validators_root,
                            id,
                            source_epoch,
                            target_epoch,
                            signing_root,
                        )
                        .await
                }
                .await;
                self.checked("attestation", public_key, checked)?
            }
            None => Decision::Allow,
        };

        Ok(self.finish("attestation", public_key, signer.as_ref(), decision, &signing_root))
    }

    /// Sign an artifact type that carries no slashing rules.
    pub fn sign_unprotected(
        &self,
        public_key: &BlsPublicKey,
        message: &[u8],
    ) -> Result<BlsSignature, HandlerError> {
        let signer = self.signer("unprotected", public_key)?;
        let signature = signer.sign(message);
        record_signing_request("unprotected", "signed");
        Ok(signature)
    }

    fn signer(
        &self,
        artifact: &str,
        public_key: &BlsPublicKey,
    ) -> Result<Arc<dyn ArtifactSigner>, HandlerError> {
        self.signers.get(public_key).ok_or_else(|| {
            record_signing_request(artifact, "unknown_key");
            HandlerError::UnknownKey {
                public_key: *public_key,
            }
        })
    }

    fn checked(
        &self,
        artifact: &str,
        public_key: &BlsPublicKey,
        result: Result<Decision, SlashingProtectionError>,
    ) -> Result<Decision, HandlerError> {
        result.map_err(|err| {
            error!(
                artifact,
                public_key = %public_key,
                error = %err,
                "Slashing protection check failed"
            );
            record_signing_request(artifact, "failed");
            HandlerError::from(err)
        })
    }

    fn finish(
        &self,
        artifact: &str,
        public_key: &BlsPublicKey,
        signer: &dyn ArtifactSigner,
        decision: Decision,
        signing_root: &Root,
    ) -> SigningOutcome {
        match decision {
            Decision::Allow => {
                record_signing_request(artifact, "signed");
                SigningOutcome::Signed(signer.sign(signing_root.as_bytes()))
            }
            Decision::Deny(reason) => {
                info!(
                    artifact,
                    public_key = %public_key,
                    reason = reason.as_str(),
                    "Refused to sign"
                );
                record_signing_request(artifact, "refused");
                SigningOutcome::Refused(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs_01_slashing_protection::test_utils::migrated_context;
    use rs_02_signing::{BlsArtifactSigner, BlsKeyPair};
    use tempfile::TempDir;

    const GVR: Root = Root([7u8; 32]);

    fn provider_with_key() -> (Arc<SignerProvider>, BlsPublicKey) {
        let keypair = BlsKeyPair::from_ikm(&[42u8; 32]).unwrap();
        let public_key = keypair.public_key();
        let provider = SignerProvider::new();
        provider.add(Arc::new(BlsArtifactSigner::new(keypair))).unwrap();
        (Arc::new(provider), public_key)
    }

    async fn protected_handler(dir: &TempDir) -> (SigningHandler, BlsPublicKey) {
        let context = migrated_context(&dir.path().join("sp.db")).await.unwrap();
        let (provider, public_key) = provider_with_key();
        let protection: Arc<dyn SlashingProtection> = context.slashing_protection();
        (SigningHandler::new(provider, protection), public_key)
    }

    #[tokio::test]
    async fn test_block_signed_then_double_proposal_refused() {
        let dir = TempDir::new().unwrap();
        let (handler, pk) = protected_handler(&dir).await;

        let first = handler.sign_block(&pk, GVR, 10, Root([1u8; 32])).await.unwrap();
        let signature = first.signature().unwrap();
        assert!(rs_02_signing::verify(&pk, &[1u8; 32], &signature));

        let second = handler.sign_block(&pk, GVR, 10, Root([2u8; 32])).await.unwrap();
        assert_eq!(second, SigningOutcome::Refused(DenyReason::DoubleBlockProposal));

        let repeat = handler.sign_block(&pk, GVR, 10, Root([1u8; 32])).await.unwrap();
        assert_eq!(repeat, first);
    }

    #[tokio::test]
    async fn test_surrounding_attestation_refused() {
        let dir = TempDir::new().unwrap();
        let (handler, pk) = protected_handler(&dir).await;

        let first = handler
            .sign_attestation(&pk, GVR, 3, 4, Root([1u8; 32]))
            .await
            .unwrap();
        assert!(matches!(first, SigningOutcome::Signed(_)));

        let outcome = handler
            .sign_attestation(&pk, GVR, 2, 5, Root([2u8; 32]))
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Refused(DenyReason::SurroundingVote));
    }

    #[tokio::test]
    async fn test_wrong_genesis_root_refused() {
        let dir = TempDir::new().unwrap();
        let (handler, pk) = protected_handler(&dir).await;

        handler.sign_block(&pk, GVR, 1, Root([1u8; 32])).await.unwrap();
        let outcome = handler
            .sign_block(&pk, Root([8u8; 32]), 2, Root([2u8; 32]))
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Refused(DenyReason::GenesisMismatch));
    }

    #[tokio::test]
    async fn test_unknown_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (handler, _) = protected_handler(&dir).await;

        let stranger = BlsPublicKey([9u8; 48]);
        let err = handler
            .sign_block(&stranger, GVR, 1, Root([1u8; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::UnknownKey { .. }));
    }

    #[tokio::test]
    async fn test_unprotected_handler_signs_conflicting_blocks() {
        let (provider, pk) = provider_with_key();
        let handler = SigningHandler::unprotected(provider);
        assert!(!handler.is_protected());

        let a = handler.sign_block(&pk, GVR, 10, Root([1u8; 32])).await.unwrap();
        let b = handler.sign_block(&pk, GVR, 10, Root([2u8; 32])).await.unwrap();
        assert!(a.signature().is_some());
        assert!(b.signature().is_some());
    }

    #[test]
    fn test_sign_unprotected() {
        let (provider, pk) = provider_with_key();
        let handler = SigningHandler::unprotected(provider);
        let signature = handler.sign_unprotected(&pk, b"randao").unwrap();
        assert!(rs_02_signing::verify(&pk, b"randao", &signature));
    }
}
