//! Access gating by the single "is authenticated" capability.
//!
//! Surfaces ask each of the three queries separately; none implies another.

use serde::Serialize;

use super::transition::offered_next;
use crate::model::Tracked;

/// What the current caller may do, derived from the session per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capability {
    authenticated: bool,
}

impl Capability {
    pub const ANONYMOUS: Self = Self {
        authenticated: false,
    };

    pub const AUTHENTICATED: Self = Self {
        authenticated: true,
    };

    #[must_use]
    pub const fn from_flag(authenticated: bool) -> Self {
        Self { authenticated }
    }

    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        self.authenticated
    }

    /// Create affordances for ideas and actions.
    #[must_use]
    pub const fn can_create(self) -> bool {
        self.authenticated
    }

    /// Status-transition and delete affordances on any record.
    #[must_use]
    pub const fn can_mutate(self) -> bool {
        self.authenticated
    }

    /// The voice review panel: listing, read toggling, deletion.
    #[must_use]
    pub const fn can_review_voice(self) -> bool {
        self.authenticated
    }
}

/// Per-record controls for an idea or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances<S> {
    pub next_status: Option<S>,
    pub can_delete: bool,
}

impl<S> Affordances<S> {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            next_status: None,
            can_delete: false,
        }
    }
}

/// Controls shown for `record`; all empty for an anonymous caller.
#[must_use]
pub fn affordances<R: Tracked>(record: &R, capability: Capability) -> Affordances<R::Status> {
    if !capability.can_mutate() {
        return Affordances::none();
    }
    let status = record.status();
    Affordances {
        next_status: offered_next(status),
        can_delete: R::deletable_at(status),
    }
}

/// Per-message controls in the review panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAffordances {
    pub can_toggle_read: bool,
    pub can_delete: bool,
}

#[must_use]
pub const fn voice_affordances(capability: Capability) -> VoiceAffordances {
    let allowed = capability.can_review_voice();
    VoiceAffordances {
        can_toggle_read: allowed,
        can_delete: allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, ActionStatus, NewAction};
    use chrono::Utc;

    fn action(status: ActionStatus) -> Action {
        let draft = NewAction::new("Leaflets", "Press", "Hand out at gate 3");
        let now = Utc::now();
        Action {
            id: "ac-0000000001".to_string(),
            name: draft.name,
            owner: draft.owner,
            description: draft.description,
            start_date: draft.start_date,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn anonymous_caller_sees_nothing() {
        for status in [ActionStatus::Planning, ActionStatus::Done] {
            assert_eq!(
                affordances(&action(status), Capability::ANONYMOUS),
                Affordances::none()
            );
        }
        assert_eq!(
            voice_affordances(Capability::ANONYMOUS),
            VoiceAffordances::default()
        );
        assert!(!Capability::ANONYMOUS.can_create());
    }

    #[test]
    fn signed_in_caller_gets_policy_driven_controls() {
        let planning = affordances(&action(ActionStatus::Planning), Capability::AUTHENTICATED);
        assert_eq!(planning.next_status, Some(ActionStatus::InProgress));
        assert!(!planning.can_delete);

        let done = affordances(&action(ActionStatus::Done), Capability::AUTHENTICATED);
        assert_eq!(done.next_status, None);
        assert!(done.can_delete);
    }
}
