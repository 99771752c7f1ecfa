use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::Lifecycle;
use super::{ParseEnumError, Record, Tracked, normalize_token, required};
use crate::error::{BoardError, Result};
use crate::store::Collection;

/// The four idea lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdeaStatus {
    New,
    #[serde(rename = "Under Review")]
    UnderReview,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl Lifecycle for IdeaStatus {
    const ORDER: &'static [Self] = &[Self::New, Self::UnderReview, Self::InProgress, Self::Done];

    fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::UnderReview => "Under Review",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::UnderReview => "under-review",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IdeaStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "new" => Ok(Self::New),
            "under-review" => Ok(Self::UnderReview),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "idea status (new, under-review, in-progress, done)",
                got: s.to_string(),
            }),
        }
    }
}

/// Subject area an idea belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Boarding,
    Safety,
    Benefits,
    Training,
    Communication,
    Other,
}

impl Theme {
    pub const ALL: [Self; 6] = [
        Self::Boarding,
        Self::Safety,
        Self::Benefits,
        Self::Training,
        Self::Communication,
        Self::Other,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Boarding => "Boarding",
            Self::Safety => "Safety",
            Self::Benefits => "Benefits",
            Self::Training => "Training",
            Self::Communication => "Communication",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = normalize_token(s);
        Self::ALL
            .into_iter()
            .find(|theme| theme.label().eq_ignore_ascii_case(&key))
            .ok_or_else(|| ParseEnumError {
                expected: "theme (boarding, safety, benefits, training, communication, other)",
                got: s.to_string(),
            })
    }
}

/// Set once at creation; never transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseEnumError {
                expected: "priority (high, medium, low)",
                got: s.to_string(),
            }),
        }
    }
}

/// A suggestion or demand raised by the membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub author: String,
    pub theme: Theme,
    pub description: String,
    pub priority: Priority,
    pub status: IdeaStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Idea {
    const COLLECTION: Collection = Collection::Ideas;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Tracked for Idea {
    type Status = IdeaStatus;

    fn status(&self) -> IdeaStatus {
        self.status
    }

    fn set_status(&mut self, status: IdeaStatus, updated_at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = updated_at;
    }

    fn deletable_at(_status: IdeaStatus) -> bool {
        true
    }
}

/// Creation input for an idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdea {
    pub author: String,
    pub theme: Theme,
    pub description: String,
    pub priority: Priority,
    pub status: IdeaStatus,
}

impl NewIdea {
    #[must_use]
    pub fn new(author: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            theme: Theme::default(),
            description: description.into(),
            priority: Priority::default(),
            status: IdeaStatus::New,
        }
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: IdeaStatus) -> Self {
        self.status = status;
        self
    }

    /// Trim text fields and check the creation form rules.
    ///
    /// # Errors
    ///
    /// `ValidationMissing` for a blank author or description;
    /// `ValidationInvalid` for a starting status past Under Review.
    pub fn validated(mut self) -> Result<Self> {
        self.author = required("author", &self.author)?;
        self.description = required("description", &self.description)?;
        if !IdeaStatus::initial_choices().contains(&self.status) {
            return Err(BoardError::ValidationInvalid {
                field: "status",
                reason: format!("a new idea starts as New or Under Review, not {}", self.status),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_label_and_slug_spellings() {
        assert_eq!("Under Review".parse::<IdeaStatus>(), Ok(IdeaStatus::UnderReview));
        assert_eq!("in-progress".parse::<IdeaStatus>(), Ok(IdeaStatus::InProgress));
        assert_eq!("NEW".parse::<IdeaStatus>(), Ok(IdeaStatus::New));
        assert!("archived".parse::<IdeaStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&IdeaStatus::UnderReview).expect("serialize");
        assert_eq!(json, "\"Under Review\"");
    }

    #[test]
    fn theme_and_priority_parse_case_insensitively() {
        assert_eq!("safety".parse::<Theme>(), Ok(Theme::Safety));
        assert_eq!("Communication".parse::<Theme>(), Ok(Theme::Communication));
        assert!("payroll".parse::<Theme>().is_err());
        assert_eq!("LOW".parse::<Priority>(), Ok(Priority::Low));
    }

    #[test]
    fn draft_defaults_match_creation_form() {
        let draft = NewIdea::new("Ana", "More lockers");
        assert_eq!(draft.theme, Theme::Boarding);
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.status, IdeaStatus::New);
    }

    #[test]
    fn draft_rejects_blank_author_and_late_start() {
        let blank = NewIdea::new("  ", "text").validated();
        assert!(matches!(blank, Err(BoardError::ValidationMissing("author"))));

        let late = NewIdea::new("Ana", "text")
            .with_status(IdeaStatus::InProgress)
            .validated();
        assert!(matches!(
            late,
            Err(BoardError::ValidationInvalid { field: "status", .. })
        ));
    }

    #[test]
    fn draft_trims_text_fields() {
        let draft = NewIdea::new(" Ana ", " More lockers\n")
            .validated()
            .expect("valid draft");
        assert_eq!(draft.author, "Ana");
        assert_eq!(draft.description, "More lockers");
    }
}
