//! Error types for Slashing Protection
//!
//! Refusals are not errors: they are returned as [`crate::Decision::Deny`].
//! Everything here means "could not check", which a caller must never read
//! as "safe to sign".

use thiserror::Error;

/// SQLite primary result codes that clear up on their own.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Storage-level failure inside a single transaction attempt.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error reported by the database driver or pool.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unsigned value does not fit the signed 64-bit column type.
    #[error("{field} value {value} exceeds the storable range")]
    OutOfRange { field: &'static str, value: u64 },

    /// Constraint violation not explained by the slashing rules.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Persisted row failed to decode.
    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl StorageError {
    /// Whether re-running the whole transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(db_err)) => db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
            StorageError::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed,
            ) => true,
            _ => false,
        }
    }
}

/// Fatal startup errors. The process must not serve requests after one.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to connect to slashing protection database {url}: {source}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to read database version, expected {expected}")]
    VersionUnreadable {
        expected: i64,
        #[source]
        source: StorageError,
    },

    #[error("Database version row is missing, expected {expected}, please run migrations and try again.")]
    VersionMissing { expected: i64 },

    #[error("Database version ({found}) does not match expected version ({expected}), please run migrations and try again.")]
    VersionMismatch { found: i64, expected: i64 },

    #[error("No genesis validators root is recorded and one is required")]
    MissingGenesisRoot,

    #[error("Invalid slashing protection parameters: {0}")]
    InvalidParameters(String),
}

/// Errors surfaced by the slashing protection API.
#[derive(Debug, Error)]
pub enum SlashingProtectionError {
    /// Storage failed and the retry policy is exhausted.
    #[error("Slashing protection {operation} failed after {attempts} attempt(s): {source}")]
    Infrastructure {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl SlashingProtectionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SlashingProtectionError::Configuration(_))
    }
}

/// Result type for slashing protection operations
pub type SlashingProtectionResult<T> = Result<T, SlashingProtectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_retryable() {
        assert!(StorageError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(StorageError::Database(sqlx::Error::WorkerCrashed).is_retryable());
    }

    #[test]
    fn test_logic_errors_are_not_retryable() {
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_retryable());
        assert!(!StorageError::OutOfRange {
            field: "slot",
            value: u64::MAX
        }
        .is_retryable());
        assert!(!StorageError::ConstraintViolation("FOREIGN KEY".into()).is_retryable());
    }

    #[test]
    fn test_version_mismatch_message() {
        let err = ConfigurationError::VersionMismatch {
            found: 3,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "Database version (3) does not match expected version (1), please run migrations and try again."
        );
        assert!(SlashingProtectionError::from(err).is_fatal());
    }
}
