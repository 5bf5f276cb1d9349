//! Record collections and the last-write-wins merge.
//!
//! A [`Collection`] owns an ordered `Vec<Record>` and an index from
//! [`RecordId`] to position in that vector. The only way records enter the
//! collection is [`Collection::add`], which keeps both structures in lockstep:
//!
//! * unknown identity: the record is appended and indexed;
//! * known identity and strictly newer `updated`: the record replaces the
//!   existing one in place, keeping its position;
//! * known identity and older or equal `updated`: the incoming record is
//!   discarded and the existing record wins.
//!
//! Merges operate on a snapshot and are committed at the end, so a batch with
//! an invalid record leaves the collection exactly as it was.
//!
//! Collections perform no internal locking. Callers must serialize every
//! operation that touches one collection.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::{
    Result,
    clock::{Clock, SystemClock},
    record::{Record, RecordId},
};

mod errors;

pub use errors::CollectionError;

/// Summary of a merge performed by [`Collection::add`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Records with a previously unknown identity.
    pub added: usize,
    /// Existing records superseded by a strictly newer version.
    pub replaced: usize,
    /// Incoming records that lost to an existing version.
    pub discarded: usize,
}

impl MergeOutcome {
    /// True if the merge changed the collection.
    pub fn changed(&self) -> bool {
        self.added + self.replaced > 0
    }
}

impl std::ops::AddAssign for MergeOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.replaced += rhs.replaced;
        self.discarded += rhs.discarded;
    }
}

/// An ordered set of records with unique identities.
#[derive(Clone)]
pub struct Collection {
    name: String,
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("records", &self.records.len())
            .finish()
    }
}

impl Collection {
    /// Creates an empty collection using the system clock.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    /// Creates an empty collection that stamps modifications with `clock`.
    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
            index: HashMap::new(),
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// All records in order, including tombstones.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Records that have not been removed.
    pub fn live(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| !r.is_removed())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    /// Merges `records` into the collection.
    ///
    /// Records without an identity are assigned a fresh one. Every record is
    /// validated before anything is committed.
    pub fn add<I>(&mut self, records: I) -> Result<MergeOutcome>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut next = self.records.clone();
        let mut index = self.index.clone();
        let mut outcome = MergeOutcome::default();

        for mut incoming in records {
            incoming
                .validate()
                .map_err(|source| CollectionError::InvalidRecord {
                    collection: self.name.clone(),
                    source,
                })?;
            let id = incoming.ensure_id().clone();

            match index.get(&id) {
                Some(&pos) => {
                    if incoming.updated > next[pos].updated {
                        next[pos] = incoming;
                        outcome.replaced += 1;
                    } else {
                        // Equal timestamps keep the existing record
                        outcome.discarded += 1;
                    }
                }
                None => {
                    index.insert(id, next.len());
                    next.push(incoming);
                    outcome.added += 1;
                }
            }
        }

        if outcome.changed() {
            self.records = next;
            self.index = index;
        }

        debug!(
            collection = %self.name,
            added = outcome.added,
            replaced = outcome.replaced,
            discarded = outcome.discarded,
            "Merged records"
        );
        Ok(outcome)
    }

    /// Records a local edit of `record`.
    ///
    /// The record is normalized (default name, empty fields dropped) and
    /// stamped strictly later than any existing version, then merged. Returns
    /// the stored version.
    pub fn update(&mut self, record: Record) -> Result<Record> {
        let previous = record.id().and_then(|id| self.get(id)).map(|r| r.updated);
        let mut stored = record.normalized(self.stamp_after(previous));
        stored.ensure_id();
        self.add([stored.clone()])?;
        Ok(stored)
    }

    /// Replaces the record with identity `id` by its tombstone.
    ///
    /// The tombstone stays in the collection so the deletion propagates through
    /// later merges. Returns the tombstone.
    pub fn remove(&mut self, id: &RecordId) -> Result<Record> {
        let existing = self
            .get(id)
            .ok_or_else(|| CollectionError::RecordNotFound {
                collection: self.name.clone(),
                id: id.clone(),
            })?;
        let tomb = existing.tombstone(self.stamp_after(Some(existing.updated)));
        self.add([tomb.clone()])?;
        Ok(tomb)
    }

    /// Empties the collection, dropping every record from memory.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Alias for [`clear`](Self::clear) used when the owning session is locked.
    pub fn lock(&mut self) {
        self.clear();
    }

    /// Current time, bumped past `previous` so a local modification always
    /// supersedes the version it was made from.
    fn stamp_after(&self, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = self.clock.now();
        match previous {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        }
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
