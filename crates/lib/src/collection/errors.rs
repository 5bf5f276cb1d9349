//! Collection error types.

use thiserror::Error;

use crate::{ErrorKind, record::RecordError, record::RecordId};

/// Errors that can occur while mutating a collection.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CollectionError {
    /// No record with the given identity exists
    #[error("Record '{id}' not found in collection '{collection}'")]
    RecordNotFound { collection: String, id: RecordId },

    /// A record in a merge batch failed validation; nothing was committed
    #[error("Invalid record in collection '{collection}': {source}")]
    InvalidRecord {
        collection: String,
        #[source]
        source: RecordError,
    },
}

impl CollectionError {
    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CollectionError::RecordNotFound { .. })
    }

    /// Get the collection name associated with this error.
    pub fn collection(&self) -> &str {
        match self {
            CollectionError::RecordNotFound { collection, .. }
            | CollectionError::InvalidRecord { collection, .. } => collection,
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            CollectionError::RecordNotFound { .. } => ErrorKind::NotFound,
            CollectionError::InvalidRecord { .. } => ErrorKind::Invalid,
        }
    }
}

impl From<CollectionError> for crate::Error {
    fn from(err: CollectionError) -> Self {
        crate::Error::Collection(err)
    }
}
