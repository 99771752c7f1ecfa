use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, required};
use crate::error::Result;
use crate::store::Collection;

/// Sender name stored when the submitter leaves it blank.
pub const ANONYMOUS_SENDER: &str = "Anonymous";

/// A message sent through the public "voice of the base" form.
///
/// `read` is a plain flag, not a lifecycle: reviewers may flip it either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub sender_name: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for VoiceMessage {
    const COLLECTION: Collection = Collection::VoiceMessages;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Creation input for a voice message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVoiceMessage {
    pub sender_name: String,
    pub body: String,
    pub read: bool,
}

impl NewVoiceMessage {
    #[must_use]
    pub fn new(sender_name: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.unwrap_or_default().to_string(),
            body: body.into(),
            read: false,
        }
    }

    /// Apply the submission rules: body required, blank sender replaced by
    /// `anonymous_label`, always unread.
    ///
    /// # Errors
    ///
    /// `ValidationMissing` when the body is blank.
    pub fn validated(mut self, anonymous_label: &str) -> Result<Self> {
        self.body = required("body", &self.body)?;
        let sender = self.sender_name.trim();
        self.sender_name = if sender.is_empty() {
            anonymous_label.to_string()
        } else {
            sender.to_string()
        };
        self.read = false;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;

    #[test]
    fn blank_sender_becomes_anonymous() {
        let msg = NewVoiceMessage::new(Some("   "), "Night shift needs a second guard")
            .validated(ANONYMOUS_SENDER)
            .expect("valid");
        assert_eq!(msg.sender_name, "Anonymous");
        assert!(!msg.read);

        let missing = NewVoiceMessage::new(None, "hello")
            .validated(ANONYMOUS_SENDER)
            .expect("valid");
        assert_eq!(missing.sender_name, "Anonymous");
    }

    #[test]
    fn named_sender_is_kept_trimmed() {
        let msg = NewVoiceMessage::new(Some(" Rita "), "hello")
            .validated(ANONYMOUS_SENDER)
            .expect("valid");
        assert_eq!(msg.sender_name, "Rita");
    }

    #[test]
    fn blank_body_is_rejected() {
        let err = NewVoiceMessage::new(Some("Rita"), " \n")
            .validated(ANONYMOUS_SENDER)
            .expect_err("blank body");
        assert!(matches!(err, BoardError::ValidationMissing("body")));
    }
}
