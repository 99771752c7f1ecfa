//! Forward-only, one-step status transitions and the per-kind delete policy.

use crate::model::{Action, ActionStatus, Idea, IdeaStatus, InvalidTransition, Lifecycle, Tracked};

/// The single next status offered at `status`, or `None` when terminal.
#[must_use]
pub fn offered_next<S: Lifecycle>(status: S) -> Option<S> {
    status.successor()
}

/// Accept `to` only when it is the immediate successor of `from`.
///
/// # Errors
///
/// [`InvalidTransition`] for no-op, backward, skipping, or terminal moves.
pub fn check_transition<S: Lifecycle>(from: S, to: S) -> Result<(), InvalidTransition> {
    from.can_transition_to(to)
}

/// Ideas may be deleted at any status, Done included.
#[must_use]
pub fn idea_deletable(status: IdeaStatus) -> bool {
    Idea::deletable_at(status)
}

/// Actions are deletable only once Done.
#[must_use]
pub fn action_deletable(status: ActionStatus) -> bool {
    Action::deletable_at(status)
}

/// Apply a checked transition to an in-memory record.
///
/// The record is left untouched when the move is rejected.
///
/// # Errors
///
/// [`InvalidTransition`] when `target` is not the immediate successor.
pub fn advance<R: Tracked>(
    record: &mut R,
    target: R::Status,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<(), InvalidTransition> {
    check_transition(record.status(), target)?;
    record.set_status(target, at);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn offered_next_is_empty_only_at_done() {
        for status in IdeaStatus::ORDER.iter().copied() {
            let offered = offered_next(status);
            assert_eq!(offered.is_none(), status == IdeaStatus::Done, "{status}");
        }
        assert_eq!(offered_next(ActionStatus::Planning), Some(ActionStatus::InProgress));
    }

    #[test]
    fn delete_policy_is_asymmetric() {
        assert!(IdeaStatus::ORDER.iter().all(|s| idea_deletable(*s)));
        assert_eq!(
            ActionStatus::ORDER
                .iter()
                .filter(|s| action_deletable(**s))
                .collect::<Vec<_>>(),
            [&ActionStatus::Done]
        );
    }

    #[test]
    fn rejected_advance_leaves_record_unchanged() {
        let created = Utc::now();
        let mut idea = Idea {
            id: "id-0000000001".to_string(),
            author: "Ana".to_string(),
            theme: crate::model::Theme::Safety,
            description: "Brighter ramp lights".to_string(),
            priority: crate::model::Priority::High,
            status: IdeaStatus::New,
            created_at: created,
            updated_at: created,
        };

        let later = created + chrono::Duration::seconds(5);
        assert!(advance(&mut idea, IdeaStatus::Done, later).is_err());
        assert_eq!(idea.status, IdeaStatus::New);
        assert_eq!(idea.updated_at, created);

        advance(&mut idea, IdeaStatus::UnderReview, later).expect("one step");
        assert_eq!(idea.status, IdeaStatus::UnderReview);
        assert_eq!(idea.updated_at, later);
    }
}
