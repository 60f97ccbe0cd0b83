//! # rs-01-slashing-protection
//!
//! Slashing protection for a remote validator signer: decides whether a block
//! or attestation may be signed and durably records every permitted one.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Validator Registry**: public key → stable id, race-free first registration
//! - **Decision Engine**: double proposal, double vote and surround vote refusal
//! - **Low Watermarks**: per-validator floor, raised only by pruning
//! - **Genesis Guard**: one genesis validators root per database
//! - **Version Gate**: refuses to start on an unexpected schema version
//!
//! ## Architecture
//!
//! ```text
//! request handler ──→ SlashingProtection (port)
//!                         │
//!                         └── DbSlashingProtection
//!                               ├── domain::rules      (pure)
//!                               └── adapters::db       (SQLite, retrying tx)
//! ```
//!
//! ## Outcomes
//!
//! | Result | Meaning | Caller |
//! |--------|---------|--------|
//! | `Ok(Decision::Allow)` | recorded (or exact repeat) | sign |
//! | `Ok(Decision::Deny(r))` | slashable or below watermark | refuse, log |
//! | `Err(Infrastructure)` | could not check | refuse, alert |
//! | `Err(Configuration)` | fatal at startup | exit |
//!
//! ## Example
//!
//! ```rust,ignore
//! use rs_01_slashing_protection::{SlashingProtection, SlashingProtectionContext};
//!
//! let context = SlashingProtectionContext::create(&params).await?;
//! let protection = context.slashing_protection();
//!
//! let id = protection.resolve_validator(&public_key).await?;
//! if protection.may_sign_block(id, slot, signing_root).await?.is_allowed() {
//!     // sign
//! }
//! ```

pub mod adapters;
pub mod context;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::db::schema::{migrate, EXPECTED_DATABASE_VERSION};
pub use adapters::db::{Database, DbConfig, RetryPolicy};
pub use context::{PruningParameters, SlashingProtectionContext, SlashingProtectionParameters};
pub use domain::{
    Decision, DenyReason, LowWatermark, PruneSummary, SignedAttestation, SignedBlock, ValidatorId,
};
pub use error::{
    ConfigurationError, SlashingProtectionError, SlashingProtectionResult, StorageError,
};
pub use ports::inbound::SlashingProtection;
pub use service::DbSlashingProtection;
