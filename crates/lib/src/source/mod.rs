//! Byte-oriented key/value persistence.
//!
//! A [`Source`] is where encrypted collection blobs live. The store only needs
//! three operations, all asynchronous:
//!
//! * `get(key)`: the stored bytes, [`SourceError::NotFound`] if absent, or
//!   [`SourceError::Unavailable`] on I/O failure;
//! * `set(key, bytes)`: replace the value atomically, so readers never see a
//!   partial write;
//! * `exists(key)`: presence check without reading the value.
//!
//! Implementations:
//!
//! * [`MemorySource`]: process-local map, for tests and ephemeral use;
//! * [`FileSource`]: one file per key in a directory, written atomically;
//! * [`HttpSource`]: a remote key/value endpoint (feature `http`);
//! * [`Timeout`]: bounds the latency of any other source.

use async_trait::async_trait;

use crate::Result;

mod errors;
mod file;
#[cfg(feature = "http")]
pub mod http;
mod memory;
mod timeout;

pub use errors::SourceError;
pub use file::FileSource;
#[cfg(feature = "http")]
pub use http::HttpSource;
pub use memory::MemorySource;
pub use timeout::Timeout;

/// Longest key accepted by [`validate_key`].
pub const MAX_KEY_LENGTH: usize = 200;

/// Asynchronous key/value persistence consumed by the store.
///
/// All sources must be `Send` and `Sync` so one source can serve several
/// tasks. Sources perform no retries; callers decide retry policy.
#[async_trait]
pub trait Source: Send + Sync {
    /// Short human-readable identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Atomically replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Checks whether a value is stored under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Checks that `key` is safe to use as a file name and URL path segment.
///
/// Keys are non-empty, at most [`MAX_KEY_LENGTH`] bytes, do not start with a
/// dot, and contain only ASCII letters, digits, `_`, `-` and `.`.
pub fn validate_key(key: &str) -> std::result::Result<(), SourceError> {
    let invalid = |reason: &str| SourceError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(invalid("key is too long"));
    }
    if key.starts_with('.') {
        return Err(invalid("key must not start with '.'"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("key may only contain ASCII letters, digits, '_', '-' and '.'"));
    }
    Ok(())
}
