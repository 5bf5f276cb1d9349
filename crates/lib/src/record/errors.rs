//! Record validation errors.

use thiserror::Error;

use super::RecordId;

/// Errors raised when a record violates the record invariants.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record carries an empty or whitespace-only identity
    #[error("Record identity must not be empty")]
    EmptyId,

    /// A removed record still carries payload
    #[error("Tombstone '{id}' must not carry a name, fields or tags")]
    TombstoneWithPayload { id: RecordId },
}

impl RecordError {
    /// Check if this error concerns the tombstone invariant.
    pub fn is_tombstone_error(&self) -> bool {
        matches!(self, RecordError::TombstoneWithPayload { .. })
    }
}

impl From<RecordError> for crate::Error {
    fn from(err: RecordError) -> Self {
        crate::Error::Record(err)
    }
}
