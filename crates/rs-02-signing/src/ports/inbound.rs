//! Driving Ports (API - Inbound)

use shared_types::{BlsPublicKey, BlsSignature};

/// The single signing capability every key source produces.
pub trait ArtifactSigner: Send + Sync {
    /// Public key this signer signs for.
    fn identifier(&self) -> BlsPublicKey;

    /// Sign a 32-byte signing root (or any message).
    fn sign(&self, message: &[u8]) -> BlsSignature;
}
