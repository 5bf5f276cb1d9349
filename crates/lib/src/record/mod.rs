//! Credential records.
//!
//! A [`Record`] is one entry of a collection: a display name, an ordered list of
//! [`Field`]s, and a set of tags. Its `updated` timestamp is the only input to
//! conflict resolution. Removing a record does not drop it; it becomes a
//! *tombstone* that keeps only `uuid`, `updated` and `removed = true` so the
//! deletion itself can be merged into other copies of the collection.
//!
//! The serialized form is the persisted record schema:
//!
//! ```text
//! {"uuid": "...", "name": "...", "updated": "2024-01-01T00:00:00Z",
//!  "fields": [{"name": "...", "value": "...", "masked": true}],
//!  "tags": ["..."], "removed": true}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod errors;
mod id;

pub use errors::RecordError;
pub use id::RecordId;

/// Name given to records saved without one.
pub const DEFAULT_RECORD_NAME: &str = "Unnamed";

/// A single named value inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    /// Hint for display layers to hide the value by default.
    #[serde(default)]
    pub masked: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            masked: false,
        }
    }

    /// Creates a field whose value should be hidden by default.
    pub fn masked(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            masked: true,
            ..Self::new(name, value)
        }
    }

    /// A field with neither a name nor a value carries no information.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

/// A credential entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uuid: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    removed: bool,
}

impl Record {
    /// Creates a record with a fresh identity, stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(RecordId::generate(), name, Utc::now())
    }

    /// Creates a record with an explicit identity and timestamp.
    pub fn with_id(
        id: impl Into<RecordId>,
        name: impl Into<String>,
        updated: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: Some(id.into()),
            name: Some(name.into()),
            updated,
            fields: Vec::new(),
            tags: Vec::new(),
            removed: false,
        }
    }

    /// Creates a record that has not been assigned an identity yet.
    ///
    /// The identity is assigned when the record is added to a collection.
    pub fn unassigned(name: impl Into<String>, updated: DateTime<Utc>) -> Self {
        Self {
            uuid: None,
            name: Some(name.into()),
            updated,
            fields: Vec::new(),
            tags: Vec::new(),
            removed: false,
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn updated_at(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = updated;
        self
    }

    /// The record identity, if one has been assigned.
    pub fn id(&self) -> Option<&RecordId> {
        self.uuid.as_ref()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Name shown to users, falling back to [`DEFAULT_RECORD_NAME`].
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_RECORD_NAME)
    }

    /// Assigns a fresh identity if the record has none and returns it.
    pub(crate) fn ensure_id(&mut self) -> &RecordId {
        self.uuid.get_or_insert_with(RecordId::generate)
    }

    /// Returns a tombstone of this record stamped at `at`.
    ///
    /// The tombstone keeps only the identity; name, fields and tags are cleared.
    /// The original record is left untouched.
    pub fn tombstone(&self, at: DateTime<Utc>) -> Record {
        Record {
            uuid: self.uuid.clone(),
            name: None,
            updated: at,
            fields: Vec::new(),
            tags: Vec::new(),
            removed: true,
        }
    }

    /// Returns the record as it is written on save, stamped at `at`.
    ///
    /// Applies the save-time defaults: a missing or blank name becomes
    /// [`DEFAULT_RECORD_NAME`] and fields with neither name nor value are
    /// dropped. Tombstones are only re-stamped.
    pub fn normalized(mut self, at: DateTime<Utc>) -> Record {
        self.updated = at;
        if self.removed {
            return self;
        }
        if self.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            self.name = Some(DEFAULT_RECORD_NAME.to_string());
        }
        self.fields.retain(|f| !f.is_empty());
        self
    }

    /// Checks the record invariants.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.uuid.as_ref().is_some_and(RecordId::is_empty) {
            return Err(RecordError::EmptyId);
        }
        if self.removed
            && (self.name.is_some() || !self.fields.is_empty() || !self.tags.is_empty())
        {
            return Err(RecordError::TombstoneWithPayload {
                id: self.uuid.clone().unwrap_or_else(|| RecordId::new("")),
            });
        }
        Ok(())
    }
}
