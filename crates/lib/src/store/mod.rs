//! Encrypted persistence of whole collections.
//!
//! A [`Store`] turns a [`Collection`] into a single blob and back:
//!
//! ```text
//! save:  records ──serde_json──▶ plaintext ──Session::encrypt──▶ blob ──Source::set──▶ "coll_<name>"
//! fetch: "coll_<name>" ──Source::get──▶ blob ──Session::decrypt──▶ plaintext ──parse──▶ Collection::add
//! ```
//!
//! Every failure carries exactly one [`ErrorKind`](crate::ErrorKind):
//! source I/O is `SourceUnavailable` or `NotFound`, a wrong password is
//! `AuthenticationFailed`, and a blob that decrypts to something other than a
//! record list is `DataCorrupted`.
//!
//! The store keeps no secret state. The password comes from the [`Session`]
//! passed to each call.

use std::sync::Arc;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{
    Error, Result,
    codec::KdfParams,
    collection::{Collection, CollectionError, MergeOutcome},
    record::Record,
    session::{Session, SessionError},
    source::Source,
};

mod errors;

pub use errors::StoreError;

/// Prefix of every collection key.
pub const DEFAULT_KEY_PREFIX: &str = "coll_";

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Argon2 parameters used for blobs written by this store.
    pub kdf: KdfParams,
    /// Prepended to the collection name to form the source key.
    pub key_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }
}

/// Per-call options for [`Store::fetch`] and [`Store::exists`].
#[derive(Default, Clone, Copy)]
pub struct FetchOptions<'a> {
    /// Source to read from instead of the store's default.
    pub source: Option<&'a dyn Source>,
}

impl<'a> FetchOptions<'a> {
    pub fn from_source(source: &'a dyn Source) -> Self {
        Self {
            source: Some(source),
        }
    }
}

/// Per-call options for [`Store::save`].
#[derive(Default, Clone)]
pub struct SaveOptions<'a> {
    /// Source to write to instead of the store's default.
    pub source: Option<&'a dyn Source>,
    /// A single edited record to normalize and merge before writing.
    pub record: Option<Record>,
}

impl<'a> SaveOptions<'a> {
    pub fn from_source(source: &'a dyn Source) -> Self {
        Self {
            source: Some(source),
            record: None,
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.record = Some(record);
        self
    }
}

/// Reads and writes encrypted collections through a default [`Source`].
#[derive(Clone)]
pub struct Store {
    source: Arc<dyn Source>,
    config: StoreConfig,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Store {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self::with_config(source, StoreConfig::default())
    }

    pub fn with_config(source: Arc<dyn Source>, config: StoreConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The default source.
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Source key under which `collection` is persisted.
    pub fn key_for(&self, collection: &Collection) -> String {
        format!("{}{}", self.config.key_prefix, collection.name())
    }

    /// Reads, decrypts and merges the persisted collection.
    ///
    /// The persisted records go through [`Collection::add`], so newer local
    /// versions survive and the returned outcome says what changed. On any
    /// error the collection is left untouched.
    pub async fn fetch(
        &self,
        collection: &mut Collection,
        session: &Session,
        options: FetchOptions<'_>,
    ) -> Result<MergeOutcome> {
        let source = self.resolve(options.source);
        let key = self.key_for(collection);
        if !session.is_unlocked() {
            return Err(SessionError::Locked.into());
        }

        let blob = source.get(&key).await?;
        let plaintext = session.decrypt(&blob)?;

        let records: Vec<Record> =
            serde_json::from_slice(&plaintext).map_err(|e| StoreError::InvalidPayload {
                collection: collection.name().to_string(),
                key: key.clone(),
                reason: e.to_string(),
            })?;
        let count = records.len();

        let outcome = collection.add(records).map_err(|e| match e {
            Error::Collection(CollectionError::InvalidRecord { collection, source }) => {
                StoreError::InvalidPayload {
                    collection,
                    key: key.clone(),
                    reason: source.to_string(),
                }
                .into()
            }
            other => other,
        })?;

        info!(
            collection = %collection.name(),
            source = %source.name(),
            records = count,
            added = outcome.added,
            replaced = outcome.replaced,
            "Fetched collection"
        );
        Ok(outcome)
    }

    /// Encrypts and writes the whole collection.
    ///
    /// When `options.record` is set it is first applied as a local edit with
    /// [`Collection::update`]. The merged record stays in the collection even
    /// if the write fails.
    pub async fn save(
        &self,
        collection: &mut Collection,
        session: &Session,
        options: SaveOptions<'_>,
    ) -> Result<()> {
        let source = self.resolve(options.source);
        let key = self.key_for(collection);
        if !session.is_unlocked() {
            return Err(SessionError::Locked.into());
        }

        if let Some(record) = options.record {
            let stored = collection.update(record)?;
            debug!(collection = %collection.name(), id = ?stored.id(), "Applied edited record");
        }

        let plaintext = Zeroizing::new(serde_json::to_vec(collection.records()).map_err(|e| {
            StoreError::SerializationFailed {
                collection: collection.name().to_string(),
                reason: e.to_string(),
            }
        })?);
        let blob = session.encrypt(&plaintext, self.config.kdf)?;
        source.set(&key, &blob).await?;

        info!(
            collection = %collection.name(),
            source = %source.name(),
            records = collection.len(),
            bytes = blob.len(),
            "Saved collection"
        );
        Ok(())
    }

    /// Checks whether the collection has been persisted. Nothing is decrypted.
    pub async fn exists(&self, collection: &Collection, options: FetchOptions<'_>) -> Result<bool> {
        let source = self.resolve(options.source);
        source.exists(&self.key_for(collection)).await
    }

    fn resolve<'a>(&'a self, source: Option<&'a dyn Source>) -> &'a dyn Source {
        source.unwrap_or(&*self.source)
    }
}
