//! # Store Error Types
//!
//! Error types for rate and history persistence.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the path and categorization           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in the CLI) ← PERSISTENCE_ERROR / INVALID_RATE              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io;
use std::path::{Path, PathBuf};
use taxi_core::CoreError;
use thiserror::Error;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file exists but could not be read.
    ///
    /// ## When This Occurs
    /// - Permissions
    /// - The path is a directory
    #[error("Could not read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be created, written or appended to.
    ///
    /// ## When This Occurs
    /// - Permissions
    /// - Disk full
    /// - Read-only file system
    #[error("Could not write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file was read but does not hold a valid rate table.
    #[error("Corrupt data in {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The write was refused by an in-memory backend set up to fail.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A domain rule rejected the input before anything was stored.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    pub(crate) fn read_failed(path: &Path, source: io::Error) -> Self {
        StoreError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write_failed(path: &Path, source: io::Error) -> Self {
        StoreError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// True for storage failures, false for rejected input.
    pub fn is_persistence(&self) -> bool {
        !matches!(self, StoreError::Core(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_core::ValidationError;

    #[test]
    fn test_error_messages_include_path() {
        let err = StoreError::write_failed(
            Path::new("/tmp/rates.json"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Could not write /tmp/rates.json: denied");

        let err = StoreError::corrupt(Path::new("rates.json"), "missing field `moving`");
        assert_eq!(
            err.to_string(),
            "Corrupt data in rates.json: missing field `moving`"
        );
    }

    #[test]
    fn test_is_persistence() {
        assert!(StoreError::Unavailable("disk full".to_string()).is_persistence());

        let rejected: StoreError = CoreError::InvalidRate(ValidationError::Negative {
            field: "moving".to_string(),
        })
        .into();
        assert!(!rejected.is_persistence());
        assert_eq!(rejected.to_string(), "Invalid rate: moving rate must not be negative");
    }
}
