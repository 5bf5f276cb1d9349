//! Encryption codec errors.

use thiserror::Error;

use crate::ErrorKind;

/// Errors produced while sealing or opening an encrypted blob.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// The authentication tag did not verify: wrong password or tampered data
    #[error("Decryption failed: wrong password or tampered data")]
    AuthenticationFailed,

    /// The blob envelope is malformed or uses unsupported parameters
    #[error("Malformed encrypted blob: {reason}")]
    MalformedBlob { reason: String },

    /// Key derivation could not run with the configured parameters
    #[error("Key derivation failed: {reason}")]
    KeyDerivation { reason: String },

    /// The cipher refused to encrypt
    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },
}

impl CodecError {
    /// Check if this error indicates a wrong password.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, CodecError::AuthenticationFailed)
    }

    /// Check if this error indicates a damaged blob.
    pub fn is_malformed(&self) -> bool {
        matches!(self, CodecError::MalformedBlob { .. })
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            CodecError::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            CodecError::MalformedBlob { .. } => ErrorKind::DataCorrupted,
            CodecError::KeyDerivation { .. } | CodecError::EncryptionFailed { .. } => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<CodecError> for crate::Error {
    fn from(err: CodecError) -> Self {
        crate::Error::Codec(err)
    }
}
