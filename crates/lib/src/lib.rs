//!
//! keysync: encrypted record storage and synchronization for credential managers.
//!
//! ## Core Concepts
//!
//! * **Records (`record::Record`)**: A single credential entry identified by an immutable uuid.
//!   Deleting a record turns it into a tombstone that keeps only its identity and timestamp.
//! * **Collections (`collection::Collection`)**: An ordered set of records with a uuid index and
//!   the last-write-wins merge used for both local edits and remotely fetched data.
//! * **Sessions (`session::Session`)**: An explicitly unlocked password with a bounded lifetime.
//!   Secrets are zeroized when the session is locked or dropped.
//! * **Sources (`source::Source`)**: Byte-oriented key/value persistence. Local files, memory and
//!   HTTP remotes all implement the same async contract.
//! * **Stores (`store::Store`)**: Serialize a collection, encrypt it with the session password,
//!   and persist it through a source under `coll_<name>`.
//! * **Sync (`sync::SyncCoordinator`)**: Pull from a remote, commit locally, push back out.

pub mod clock;
pub mod codec;
pub mod collection;
pub mod record;
pub mod session;
pub mod source;
pub mod store;
pub mod sync;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::{ClockHold, FixedClock};
pub use collection::{Collection, MergeOutcome};
pub use record::{Field, Record, RecordId};
pub use session::Session;
pub use source::Source;
pub use store::{FetchOptions, SaveOptions, Store, StoreConfig};
pub use sync::{SyncCoordinator, SyncReport};

/// Result type used throughout the keysync library.
pub type Result<T> = std::result::Result<T, Error>;

/// The failure categories a caller can branch on.
///
/// Every [`Error`] maps to exactly one kind through [`Error::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Source I/O failed (network, disk, timeout). The caller may retry.
    SourceUnavailable,
    /// The key or record does not exist.
    NotFound,
    /// Decryption failed its integrity check, i.e. the password is wrong.
    AuthenticationFailed,
    /// Decryption succeeded but the payload is not a valid record list,
    /// or the blob envelope itself is malformed.
    DataCorrupted,
    /// The session holds no password.
    Locked,
    /// The caller supplied an invalid record, key or option.
    Invalid,
    /// Codec setup or serialization failed for reasons unrelated to the data.
    Internal,
}

/// Common error type for the keysync library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured record validation errors
    #[error(transparent)]
    Record(record::RecordError),

    /// Structured collection errors
    #[error(transparent)]
    Collection(collection::CollectionError),

    /// Structured encryption codec errors
    #[error(transparent)]
    Codec(codec::CodecError),

    /// Structured session errors
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured source errors
    #[error(transparent)]
    Source(source::SourceError),

    /// Structured store errors
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Serialize(_) => "serialize",
            Error::Record(_) => "record",
            Error::Collection(_) => "collection",
            Error::Codec(_) => "codec",
            Error::Session(_) => "session",
            Error::Source(_) => "source",
            Error::Store(_) => "store",
        }
    }

    /// Classify this error into one of the [`ErrorKind`] categories.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Serialize(_) => ErrorKind::Internal,
            Error::Record(_) => ErrorKind::Invalid,
            Error::Collection(err) => err.kind(),
            Error::Codec(err) => err.kind(),
            Error::Session(_) => ErrorKind::Locked,
            Error::Source(err) => err.kind(),
            Error::Store(err) => err.kind(),
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error indicates a source could not be reached.
    pub fn is_unavailable(&self) -> bool {
        self.kind() == ErrorKind::SourceUnavailable
    }

    /// Check if this error indicates a wrong password.
    pub fn is_authentication_error(&self) -> bool {
        self.kind() == ErrorKind::AuthenticationFailed
    }

    /// Check if this error indicates corrupted persisted data.
    pub fn is_corrupted(&self) -> bool {
        self.kind() == ErrorKind::DataCorrupted
    }

    /// Check if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::SourceUnavailable
    }
}
