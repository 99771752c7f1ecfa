use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::Lifecycle;
use super::{ParseEnumError, Record, Tracked, normalize_token, required};
use crate::error::{BoardError, Result};
use crate::store::Collection;

/// The three action lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl Lifecycle for ActionStatus {
    const ORDER: &'static [Self] = &[Self::Planning, Self::InProgress, Self::Done];

    fn label(self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "planning" => Ok(Self::Planning),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "action status (planning, in-progress, done)",
                got: s.to_string(),
            }),
        }
    }
}

/// Practical work carried out by the board's officers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub status: ActionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Action {
    const COLLECTION: Collection = Collection::Actions;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Tracked for Action {
    type Status = ActionStatus;

    fn status(&self) -> ActionStatus {
        self.status
    }

    fn set_status(&mut self, status: ActionStatus, updated_at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = updated_at;
    }

    // Only finished actions offer delete in the review surface.
    fn deletable_at(status: ActionStatus) -> bool {
        matches!(status, ActionStatus::Done)
    }
}

/// Creation input for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    pub name: String,
    pub owner: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub status: ActionStatus,
}

impl NewAction {
    /// Draft starting today in Planning.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            description: description.into(),
            start_date: Utc::now().date_naive(),
            status: ActionStatus::Planning,
        }
    }

    #[must_use]
    pub const fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = status;
        self
    }

    /// Trim text fields and check the creation form rules.
    ///
    /// # Errors
    ///
    /// `ValidationMissing` for a blank name, owner, or description;
    /// `ValidationInvalid` for a starting status of Done.
    pub fn validated(mut self) -> Result<Self> {
        self.name = required("name", &self.name)?;
        self.owner = required("owner", &self.owner)?;
        self.description = required("description", &self.description)?;
        if !ActionStatus::initial_choices().contains(&self.status) {
            return Err(BoardError::ValidationInvalid {
                field: "status",
                reason: format!(
                    "a new action starts as Planning or In Progress, not {}",
                    self.status
                ),
            });
        }
        Ok(self)
    }
}
