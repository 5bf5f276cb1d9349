//! Latency bound for any source.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use tracing::warn;

use super::{Source, SourceError};
use crate::Result;

/// Wraps a [`Source`] so that every operation completes within `after`.
///
/// An operation that runs out of time fails with [`SourceError::Timeout`],
/// which callers treat like any other unavailable source. The underlying
/// operation is dropped, not cancelled on the far side; a timed-out `set`
/// may still land.
#[derive(Debug)]
pub struct Timeout<S> {
    inner: S,
    after: Duration,
}

impl<S: Source> Timeout<S> {
    pub fn new(inner: S, after: Duration) -> Self {
        Self { inner, after }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(&self, key: &str, op: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.after, op).await {
            Ok(result) => result,
            Err(_) => {
                warn!(source = self.inner.name(), key, after = ?self.after, "Source operation timed out");
                Err(SourceError::Timeout {
                    source_name: self.inner.name().to_string(),
                    key: key.to_string(),
                    after: self.after,
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl<S: Source> Source for Timeout<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.bounded(key, self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.bounded(key, self.inner.set(key, value)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.bounded(key, self.inner.exists(key)).await
    }
}
