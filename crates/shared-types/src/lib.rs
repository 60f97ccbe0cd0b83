//! # Shared Types Crate
//!
//! Fixed-width byte types used across the signer workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: a signing root or a BLS public key has exactly
//!   one Rust type, whichever crate touches it.
//! - **Opaque bytes**: nothing here interprets key material; keys are compared
//!   and stored as byte strings.
//! - **Hex on the edges**: `Display`, `FromStr` and serde all use `0x`-prefixed
//!   lowercase hex, the format key files and operators use.

pub mod bytes;
pub mod errors;

pub use bytes::{BlsPublicKey, BlsSignature, Root};
pub use errors::BytesError;

/// Beacon chain slot number.
pub type Slot = u64;

/// Beacon chain epoch number.
pub type Epoch = u64;
