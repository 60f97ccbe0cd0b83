//! # rs-02-signing
//!
//! Key sources for the remote signer.
//!
//! ## Overview
//!
//! Each key is described by a [`SigningMetadata`] variant. The factory has
//! one constructor per variant and every one of them yields the same
//! capability, an `Arc<dyn ArtifactSigner>`. Slashing protection never sees
//! which backend a key came from.
//!
//! ```text
//! keys/*.yaml ──→ SigningMetadata ──→ ArtifactSignerFactory ──→ dyn ArtifactSigner
//!                                           │
//!                                           └── SecretFetcher (remote backends)
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{verify, BlsKeyPair, SigningMetadata};
pub use error::{SigningError, SigningResult};
pub use ports::{ArtifactSigner, SecretFetcher, SecretRequest};
pub use service::{ArtifactSignerFactory, BlsArtifactSigner, SignerProvider};
