//! Error types for roledb core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in roledb core operations.
///
/// A missing key is never an error: lookups return `Option` and removals
/// return `bool`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    ///
    /// When this surfaces from a mutating call the file and the pointer
    /// index may disagree; the store does not attempt repair.
    #[error("storage error: {0}")]
    Storage(#[from] roledb_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Payload rejected before any mutation took place.
    #[error("payload too large: {len} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Maximum accepted payload length.
        max: usize,
    },

    /// The index scan found a record it cannot interpret.
    #[error("corrupt record at offset {offset}: {message}")]
    CorruptRecord {
        /// Header offset of the offending record.
        offset: u64,
        /// Description of the problem.
        message: String,
    },

    /// Encoding or decoding a cached value failed.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the failure.
        message: String,
    },

    /// Another handle already has the record file open.
    #[error("store locked: another handle has exclusive access")]
    StoreLocked,

    /// The store has been closed.
    #[error("store is closed")]
    StoreClosed,
}

impl CoreError {
    /// Creates a corrupt record error.
    pub fn corrupt_record(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            offset,
            message: message.into(),
        }
    }

    /// Creates a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Returns whether this error rejected a payload before mutating anything.
    #[must_use]
    pub fn is_size_violation(&self) -> bool {
        matches!(self, Self::PayloadTooLarge { .. })
    }

    /// Maps a storage error, folding backend lock contention into
    /// [`CoreError::StoreLocked`].
    pub(crate) fn from_open(err: roledb_storage::StorageError) -> Self {
        match err {
            roledb_storage::StorageError::Locked => Self::StoreLocked,
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_violation_predicate() {
        let err = CoreError::PayloadTooLarge { len: 10, max: 5 };
        assert!(err.is_size_violation());
        assert!(!CoreError::StoreClosed.is_size_violation());
    }

    #[test]
    fn display_includes_offset() {
        let err = CoreError::corrupt_record(40, "length exceeds maximum");
        assert_eq!(
            err.to_string(),
            "corrupt record at offset 40: length exceeds maximum"
        );
    }

    #[test]
    fn locked_backend_maps_to_store_locked() {
        let err = CoreError::from_open(roledb_storage::StorageError::Locked);
        assert!(matches!(err, CoreError::StoreLocked));
    }
}
