//! Signing error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading keys or signing.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Private key bytes are not a valid BLS12-381 scalar.
    #[error("Invalid private key: {reason}")]
    InvalidPrivateKey { reason: String },

    /// Key configuration file could not be read.
    #[error("Failed to read key configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key configuration file is not valid signing metadata.
    #[error("Invalid signing metadata in {path}: {source}")]
    InvalidMetadata {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A remote backend was configured but no secret fetcher is available.
    #[error("No secret fetcher configured for {backend} keys")]
    BackendUnavailable { backend: &'static str },

    /// The secret fetcher failed.
    #[error("Failed to fetch secret from {backend}: {reason}")]
    SecretFetch { backend: &'static str, reason: String },

    /// Two configuration files resolve to the same public key.
    #[error("Duplicate signing key {public_key}")]
    DuplicateKey { public_key: String },
}

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;
