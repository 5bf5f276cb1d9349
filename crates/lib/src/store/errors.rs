//! Store error types.
//!
//! Source, session and codec failures pass through the store unchanged; the
//! variants here cover what the store itself detects.

use thiserror::Error;

use crate::ErrorKind;

/// Errors raised by [`Store`](super::Store) operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The blob decrypted but its plaintext is not a valid record list
    #[error("Corrupted payload for collection '{collection}' at '{key}': {reason}")]
    InvalidPayload {
        collection: String,
        key: String,
        reason: String,
    },

    /// The collection could not be serialized for writing
    #[error("Failed to serialize collection '{collection}': {reason}")]
    SerializationFailed { collection: String, reason: String },
}

impl StoreError {
    /// Check if this error indicates corrupted persisted data.
    pub fn is_corrupted(&self) -> bool {
        matches!(self, StoreError::InvalidPayload { .. })
    }

    /// Get the collection name associated with this error.
    pub fn collection(&self) -> &str {
        match self {
            StoreError::InvalidPayload { collection, .. }
            | StoreError::SerializationFailed { collection, .. } => collection,
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidPayload { .. } => ErrorKind::DataCorrupted,
            StoreError::SerializationFailed { .. } => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
