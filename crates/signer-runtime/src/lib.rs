//! # Signer Runtime Library
//!
//! Startup wiring for the remote signer. The `main.rs` binary is a thin
//! shell around [`SignerRuntime`].
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `SIGNER_*` variables
//! 2. Load signing keys from the key config directory
//! 3. Install the schema (only with `SIGNER_DB_AUTO_MIGRATE`)
//! 4. Open slashing protection; a wrong schema version or missing required
//!    genesis root stops here
//! 5. Register every loaded key as a validator
//! 6. Schedule pruning
//! 7. Serve signing requests through [`SigningHandler`]

pub mod config;
pub mod handlers;
pub mod pruning;
mod runtime;

pub use config::{ConfigError, SignerConfig};
pub use handlers::{HandlerError, SigningHandler, SigningOutcome};
pub use runtime::SignerRuntime;
