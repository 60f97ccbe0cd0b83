//! Service layer for key sources.

pub mod factory;
pub mod signers;

pub use factory::{ArtifactSignerFactory, BlsArtifactSigner};
pub use signers::SignerProvider;
