//! # Error Types
//!
//! Errors produced while turning untrusted input into fixed-width byte types.

use thiserror::Error;

/// Errors that can occur when parsing fixed-width byte values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytesError {
    /// Input had the wrong number of bytes.
    #[error("Invalid length for {kind}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Input was not valid hexadecimal.
    #[error("Invalid hex for {kind}: {reason}")]
    InvalidHex { kind: &'static str, reason: String },
}
