//! Flat document store behind the board.
//!
//! Three independent collections, each supporting append, ordered full
//! fetch, merge-patch, and delete. No query predicates are pushed down:
//! filtering happens on the fetched snapshot.

pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::RngCore;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::ParseEnumError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Field name the store stamps on every appended document.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Top-level document body.
pub type Fields = Map<String, Value>;

/// The three record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Ideas,
    Actions,
    VoiceMessages,
}

impl Collection {
    pub const ALL: [Self; 3] = [Self::Ideas, Self::Actions, Self::VoiceMessages];

    /// Persisted collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ideas => "ideas",
            Self::Actions => "actions",
            Self::VoiceMessages => "voice-messages",
        }
    }

    /// Prefix of generated document ids.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Ideas => "id",
            Self::Actions => "ac",
            Self::VoiceMessages => "vm",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                expected: "collection (ideas, actions, voice-messages)",
                got: s.to_string(),
            })
    }
}

/// A stored document: immutable identity, server timestamp, and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub fields: Fields,
}

/// Backend contract shared by the SQLite and in-memory stores.
///
/// Writes are last-write-wins: no version is checked on patch or delete.
pub trait RecordStore {
    /// Insert a new document, assigning its id and `createdAt`.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` on backend failure.
    fn append(&mut self, collection: Collection, fields: Fields) -> Result<Document>;

    /// Every document in `collection`, newest first; ties keep the later
    /// insert first.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` on backend failure.
    fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Overwrite only the named top-level fields.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `StoreUnavailable` on backend failure.
    fn patch(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<()>;

    /// Permanently remove a document.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `StoreUnavailable` on backend failure.
    fn delete(&mut self, collection: Collection, id: &str) -> Result<()>;
}

/// Derive a short document id: `<prefix>-<10 hex chars>`.
///
/// The digest covers the collection, the creation instant, and a random
/// nonce so two appends in the same microsecond still differ.
#[must_use]
pub fn generate_id(collection: Collection, now: DateTime<Utc>) -> String {
    let mut nonce = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut hasher = blake3::Hasher::new();
    hasher.update(collection.as_str().as_bytes());
    hasher.update(&now.timestamp_micros().to_le_bytes());
    hasher.update(&nonce);
    let hex = hasher.finalize().to_hex();
    format!("{}-{}", collection.id_prefix(), &hex.as_str()[..10])
}

/// RFC 3339 with microseconds, as stamped into `createdAt`.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Stamp `createdAt` into a body about to be appended.
pub(crate) fn stamp_created(fields: &mut Fields, now: DateTime<Utc>) {
    fields.insert(
        CREATED_AT_FIELD.to_string(),
        Value::String(format_timestamp(now)),
    );
}

/// Merge-patch: each named top-level key replaces the stored value.
pub(crate) fn merge_patch(target: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_carry_collection_prefix_and_differ() {
        let now = Utc::now();
        let a = generate_id(Collection::Ideas, now);
        let b = generate_id(Collection::Ideas, now);
        assert!(a.starts_with("id-"), "{a}");
        assert_eq!(a.len(), 13);
        assert_ne!(a, b);
        assert!(generate_id(Collection::VoiceMessages, now).starts_with("vm-"));
    }

    #[test]
    fn collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>(), Ok(collection));
        }
        assert!("messages".parse::<Collection>().is_err());
    }

    #[test]
    fn merge_patch_only_touches_named_fields() {
        let mut body = json!({"status": "New", "author": "Ana"})
            .as_object()
            .cloned()
            .expect("object");
        let patch = json!({"status": "Under Review"})
            .as_object()
            .cloned()
            .expect("object");
        merge_patch(&mut body, patch);
        assert_eq!(body["status"], "Under Review");
        assert_eq!(body["author"], "Ana");
    }
}
