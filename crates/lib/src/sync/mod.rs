//! Pull, commit, push.
//!
//! [`SyncCoordinator::run`] reconciles one collection against a remote source
//! while a local source keeps the offline copy:
//!
//! 1. **Pull**: fetch the remote blob and merge it. A remote without the key
//!    is treated as an empty collection.
//! 2. **Commit**: save the merged collection to the local source.
//! 3. **Push**: save the same state to the remote.
//!
//! The local write always lands before the remote is touched, so a failed
//! push never loses merged data. Any failure other than the remote's
//! `NotFound` stops the run and is returned as is.
//!
//! Running the coordinator twice without local edits changes nothing: the
//! second pull merges records that are already present.

use std::fmt;

use tracing::{info, warn};

use crate::{
    Result,
    collection::{Collection, MergeOutcome},
    session::Session,
    source::Source,
    store::{FetchOptions, SaveOptions, Store},
};

/// Phases of a sync run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Pull,
    Commit,
    Push,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Pull => "pull",
            SyncPhase::Commit => "commit",
            SyncPhase::Push => "push",
        };
        f.write_str(name)
    }
}

/// What a successful sync did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Result of merging the remote records.
    pub pulled: MergeOutcome,
    /// Whether the remote held the collection before the run.
    pub remote_existed: bool,
}

/// Runs the three sync phases through a [`Store`].
#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    store: Store,
}

impl SyncCoordinator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Synchronizes `collection` with `remote`, committing to `local` first.
    ///
    /// Callers must not run other operations on the same collection until
    /// this returns.
    pub async fn run(
        &self,
        collection: &mut Collection,
        session: &Session,
        local: &dyn Source,
        remote: &dyn Source,
    ) -> Result<SyncReport> {
        info!(
            collection = %collection.name(),
            local = %local.name(),
            remote = %remote.name(),
            "Starting sync"
        );

        let mut report = SyncReport::default();

        match self
            .store
            .fetch(collection, session, FetchOptions::from_source(remote))
            .await
        {
            Ok(outcome) => {
                report.pulled = outcome;
                report.remote_existed = true;
            }
            Err(e) if e.is_not_found() => {
                info!(collection = %collection.name(), "Remote has no copy yet");
            }
            Err(e) => return Err(self.abort(collection, SyncPhase::Pull, e)),
        }

        self.store
            .save(collection, session, SaveOptions::from_source(local))
            .await
            .map_err(|e| self.abort(collection, SyncPhase::Commit, e))?;

        self.store
            .save(collection, session, SaveOptions::from_source(remote))
            .await
            .map_err(|e| self.abort(collection, SyncPhase::Push, e))?;

        info!(
            collection = %collection.name(),
            records = collection.len(),
            added = report.pulled.added,
            replaced = report.pulled.replaced,
            remote_existed = report.remote_existed,
            "Sync complete"
        );
        Ok(report)
    }

    fn abort(&self, collection: &Collection, phase: SyncPhase, err: crate::Error) -> crate::Error {
        warn!(
            collection = %collection.name(),
            %phase,
            kind = ?err.kind(),
            error = %err,
            "Sync aborted"
        );
        err
    }
}
