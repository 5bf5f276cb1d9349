//! Session error types.

use thiserror::Error;

/// Errors raised by session state.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session holds no password
    #[error("Session is locked; unlock it with a password first")]
    Locked,
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
