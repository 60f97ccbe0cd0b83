//! Domain layer for key sources.

pub mod bls;
pub mod metadata;

pub use bls::{verify, BlsKeyPair};
pub use metadata::SigningMetadata;
