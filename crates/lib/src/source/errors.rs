//! Source error types.

use std::time::Duration;

use thiserror::Error;

use crate::ErrorKind;

/// Errors that can occur while talking to a [`Source`](super::Source).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SourceError {
    /// The key is absent
    #[error("Key '{key}' not found in source '{source_name}'")]
    NotFound { source_name: String, key: String },

    /// The source could not be read or written
    #[error("Source '{source_name}' unavailable for key '{key}': {reason}")]
    Unavailable {
        source_name: String,
        key: String,
        reason: String,
    },

    /// The operation did not complete in time
    #[error("Source '{source_name}' timed out after {after:?} for key '{key}'")]
    Timeout {
        source_name: String,
        key: String,
        after: Duration,
    },

    /// The key cannot be used by this source
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// The source address cannot be used
    #[error("Invalid source address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

impl SourceError {
    /// Check if this error indicates the key was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }

    /// Check if this error indicates an I/O failure or timeout.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SourceError::Unavailable { .. } | SourceError::Timeout { .. }
        )
    }

    /// Get the key associated with this error, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            SourceError::NotFound { key, .. }
            | SourceError::Unavailable { key, .. }
            | SourceError::Timeout { key, .. }
            | SourceError::InvalidKey { key, .. } => Some(key),
            SourceError::InvalidAddress { .. } => None,
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            SourceError::NotFound { .. } => ErrorKind::NotFound,
            SourceError::Unavailable { .. } | SourceError::Timeout { .. } => {
                ErrorKind::SourceUnavailable
            }
            SourceError::InvalidKey { .. } | SourceError::InvalidAddress { .. } => {
                ErrorKind::Invalid
            }
        }
    }
}

impl From<SourceError> for crate::Error {
    fn from(err: SourceError) -> Self {
        crate::Error::Source(err)
    }
}
