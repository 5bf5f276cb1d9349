//! In-memory source.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Source, SourceError, validate_key};
use crate::Result;

/// A process-local [`Source`] backed by a map.
///
/// Useful as a test double: it can be switched offline to simulate an
/// unreachable source, and it counts successful writes.
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    values: RwLock<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Makes every operation fail with [`SourceError::Unavailable`] while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns a copy of the raw value under `key`, bypassing the offline switch.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.values.read().await.get(key).cloned()
    }

    /// Keys currently stored.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_online(&self, key: &str) -> std::result::Result<(), SourceError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable {
                source_name: self.name.clone(),
                key: key.to_string(),
                reason: "source is offline".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl Source for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        self.check_online(key)?;
        self.values.read().await.get(key).cloned().ok_or_else(|| {
            SourceError::NotFound {
                source_name: self.name.clone(),
                key: key.to_string(),
            }
            .into()
        })
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.check_online(key)?;
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.check_online(key)?;
        Ok(self.values.read().await.contains_key(key))
    }
}
