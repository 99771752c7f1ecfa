//! Record kinds kept on the board and the enums they carry.

pub mod action;
pub mod idea;
pub mod lifecycle;
pub mod voice;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BoardError, Result};
use crate::store::{Collection, Document};

pub use action::{Action, ActionStatus, NewAction};
pub use idea::{Idea, IdeaStatus, NewIdea, Priority, Theme};
pub use lifecycle::{InvalidTransition, Lifecycle};
pub use voice::{ANONYMOUS_SENDER, NewVoiceMessage, VoiceMessage};

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

/// Fold label and CLI spellings onto one key: `"Under Review"`,
/// `"under_review"` and `"UNDER-REVIEW"` all become `"under-review"`.
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Trim a required text field, rejecting blank input.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::ValidationMissing(field));
    }
    Ok(trimmed.to_string())
}

/// A typed view over one store collection.
pub trait Record: Clone + Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn assign_id(&mut self, id: String);

    /// Decode a stored document, attaching the store-assigned identity.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` when the document body does not decode.
    fn from_document(doc: Document) -> Result<Self> {
        let mut record: Self = serde_json::from_value(Value::Object(doc.fields))?;
        record.assign_id(doc.id);
        Ok(record)
    }
}

/// A record that moves through an ordered status lifecycle.
pub trait Tracked: Record {
    type Status: Lifecycle;

    fn status(&self) -> Self::Status;

    /// Apply an already-validated status change.
    fn set_status(&mut self, status: Self::Status, updated_at: DateTime<Utc>);

    /// Whether the review surface offers delete at `status`.
    fn deletable_at(status: Self::Status) -> bool;
}

#[cfg(test)]
mod tests {
    use super::normalize_token;

    #[test]
    fn normalize_folds_spaces_underscores_and_case() {
        assert_eq!(normalize_token("Under Review"), "under-review");
        assert_eq!(normalize_token(" in_progress "), "in-progress");
        assert_eq!(normalize_token("DONE"), "done");
    }
}
