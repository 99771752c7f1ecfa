//! Summary counts, recomputed from a snapshot on every load.

use serde::Serialize;

use crate::model::{ActionStatus, Idea, IdeaStatus, Lifecycle, Tracked, VoiceMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: usize,
}

/// Total plus one zero-filled entry per lifecycle state, in lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts<S> {
    pub total: usize,
    pub by_status: Vec<StatusCount<S>>,
}

impl<S: Lifecycle> StatusCounts<S> {
    #[must_use]
    pub fn count(&self, status: S) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }
}

/// Count `records` by status.
#[must_use]
pub fn aggregate<R: Tracked>(records: &[R]) -> StatusCounts<R::Status> {
    let by_status = R::Status::ORDER
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: records.iter().filter(|r| r.status() == *status).count(),
        })
        .collect();
    StatusCounts {
        total: records.len(),
        by_status,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReadCounts {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
}

impl ReadCounts {
    #[must_use]
    pub fn from_messages(messages: &[VoiceMessage]) -> Self {
        let read = messages.iter().filter(|m| m.read).count();
        Self {
            total: messages.len(),
            read,
            unread: messages.len() - read,
        }
    }
}

/// Counts shown on the signed-in dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub ideas: StatusCounts<IdeaStatus>,
    pub actions: StatusCounts<ActionStatus>,
    pub voice: ReadCounts,
}

/// Idea counts shown on the public landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSummary {
    pub total_ideas: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl PublicSummary {
    #[must_use]
    pub fn from_ideas(ideas: &[Idea]) -> Self {
        let counts = aggregate(ideas);
        Self {
            total_ideas: counts.total,
            in_progress: counts.count(IdeaStatus::InProgress),
            done: counts.count(IdeaStatus::Done),
        }
    }
}

#[must_use]
pub fn summarize(
    ideas: &[Idea],
    actions: &[crate::model::Action],
    voice: &[VoiceMessage],
) -> DashboardSummary {
    DashboardSummary {
        ideas: aggregate(ideas),
        actions: aggregate(actions),
        voice: ReadCounts::from_messages(voice),
    }
}
