//! Ports layer for key sources.

pub mod inbound;
pub mod outbound;

pub use inbound::ArtifactSigner;
pub use outbound::{SecretFetcher, SecretRequest};
