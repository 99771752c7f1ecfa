//! Board operations: the engine's decisions applied to a store for a caller.
//!
//! Every write checks the caller's capability first, then validates, then
//! persists. Reads return full snapshots; the `*_or_empty` variants degrade a
//! store failure to an empty snapshot with a warning.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::engine::filter::{self, StatusFilter};
use crate::engine::stats::{self, DashboardSummary, PublicSummary};
use crate::engine::transition::check_transition;
use crate::error::{BoardError, Result};
use crate::model::{
    ANONYMOUS_SENDER, Action, ActionStatus, Idea, IdeaStatus, Lifecycle, NewAction, NewIdea,
    NewVoiceMessage, Record, Tracked, VoiceMessage,
};
use crate::session::Caller;
use crate::store::{Fields, RecordStore, format_timestamp};

const STATUS_FIELD: &str = "status";
const UPDATED_AT_FIELD: &str = "updatedAt";
const READ_FIELD: &str = "read";

pub struct Board<S> {
    store: S,
    anonymous_label: String,
}

impl<S: RecordStore> Board<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            anonymous_label: ANONYMOUS_SENDER.to_string(),
        }
    }

    /// Override the sender recorded for unsigned voice messages. A blank
    /// label keeps [`ANONYMOUS_SENDER`].
    #[must_use]
    pub fn with_anonymous_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            warn!("blank anonymous label configured; using {ANONYMOUS_SENDER:?}");
        } else {
            self.anonymous_label = label.to_string();
        }
        self
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // -- ideas ------------------------------------------------------------

    /// # Errors
    ///
    /// `Unauthenticated`, validation errors, or `StoreUnavailable`.
    pub fn create_idea(&mut self, caller: &Caller, draft: NewIdea) -> Result<Idea> {
        require(caller.capability().can_create(), "create ideas")?;
        self.create(draft.validated()?)
    }

    /// Ideas passing `filter`, newest first.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the snapshot cannot be loaded.
    pub fn list_ideas(&self, filter: &StatusFilter<IdeaStatus>) -> Result<Vec<Idea>> {
        self.list(filter)
    }

    #[must_use]
    pub fn list_ideas_or_empty(&self, filter: &StatusFilter<IdeaStatus>) -> Vec<Idea> {
        or_empty(self.list(filter))
    }

    /// # Errors
    ///
    /// `NotFound` or `StoreUnavailable`.
    pub fn idea(&self, id: &str) -> Result<Idea> {
        self.find(id)
    }

    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, `InvalidTransition`, or
    /// `StoreUnavailable`.
    pub fn advance_idea(&mut self, caller: &Caller, id: &str, target: IdeaStatus) -> Result<Idea> {
        self.advance(caller, id, target)
    }

    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, or `StoreUnavailable`.
    pub fn delete_idea(&mut self, caller: &Caller, id: &str) -> Result<()> {
        self.delete::<Idea>(caller, id)
    }

    // -- actions ----------------------------------------------------------

    /// # Errors
    ///
    /// `Unauthenticated`, validation errors, or `StoreUnavailable`.
    pub fn create_action(&mut self, caller: &Caller, draft: NewAction) -> Result<Action> {
        require(caller.capability().can_create(), "create actions")?;
        self.create(draft.validated()?)
    }

    /// # Errors
    ///
    /// `StoreUnavailable` when the snapshot cannot be loaded.
    pub fn list_actions(&self, filter: &StatusFilter<ActionStatus>) -> Result<Vec<Action>> {
        self.list(filter)
    }

    #[must_use]
    pub fn list_actions_or_empty(&self, filter: &StatusFilter<ActionStatus>) -> Vec<Action> {
        or_empty(self.list(filter))
    }

    /// # Errors
    ///
    /// `NotFound` or `StoreUnavailable`.
    pub fn action(&self, id: &str) -> Result<Action> {
        self.find(id)
    }

    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, `InvalidTransition`, or
    /// `StoreUnavailable`.
    pub fn advance_action(
        &mut self,
        caller: &Caller,
        id: &str,
        target: ActionStatus,
    ) -> Result<Action> {
        self.advance(caller, id, target)
    }

    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, `DeleteNotOffered` before Done, or
    /// `StoreUnavailable`.
    pub fn delete_action(&mut self, caller: &Caller, id: &str) -> Result<()> {
        self.delete::<Action>(caller, id)
    }

    // -- voice messages ---------------------------------------------------

    /// Open to anyone, signed in or not.
    ///
    /// # Errors
    ///
    /// `ValidationMissing` for a blank body, or `StoreUnavailable`.
    pub fn submit_voice(&mut self, draft: NewVoiceMessage) -> Result<VoiceMessage> {
        let draft = draft.validated(&self.anonymous_label)?;
        let doc = self.store.append(VoiceMessage::COLLECTION, to_fields(&draft)?)?;
        let message = VoiceMessage::from_document(doc)?;
        info!(id = %message.id, "voice message received");
        Ok(message)
    }

    /// The review panel's message list, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `StoreUnavailable`.
    pub fn list_voice(&self, caller: &Caller) -> Result<Vec<VoiceMessage>> {
        require(caller.capability().can_review_voice(), "review voice messages")?;
        self.load()
    }

    /// # Errors
    ///
    /// `Unauthenticated`; store failures degrade to an empty list.
    pub fn list_voice_or_empty(&self, caller: &Caller) -> Result<Vec<VoiceMessage>> {
        require(caller.capability().can_review_voice(), "review voice messages")?;
        Ok(or_empty(self.load()))
    }

    /// Flip `read` in either direction.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, or `StoreUnavailable`.
    pub fn toggle_read(&mut self, caller: &Caller, id: &str) -> Result<VoiceMessage> {
        require(caller.capability().can_review_voice(), "toggle voice messages")?;
        let mut message: VoiceMessage = self.find(id)?;
        message.read = !message.read;

        let mut patch = Fields::new();
        patch.insert(READ_FIELD.to_string(), Value::Bool(message.read));
        self.store.patch(VoiceMessage::COLLECTION, id, patch)?;
        info!(%id, read = message.read, "toggled voice message");
        Ok(message)
    }

    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, or `StoreUnavailable`.
    pub fn delete_voice(&mut self, caller: &Caller, id: &str) -> Result<()> {
        require(caller.capability().can_review_voice(), "delete voice messages")?;
        self.store.delete(VoiceMessage::COLLECTION, id)?;
        info!(%id, "deleted voice message");
        Ok(())
    }

    // -- summaries --------------------------------------------------------

    /// Dashboard counts. Collections that fail to load count as empty.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for an anonymous caller.
    pub fn summary(&self, caller: &Caller) -> Result<DashboardSummary> {
        require(caller.capability().is_authenticated(), "view the dashboard")?;
        let ideas: Vec<Idea> = or_empty(self.load());
        let actions: Vec<Action> = or_empty(self.load());
        let voice: Vec<VoiceMessage> = or_empty(self.load());
        Ok(stats::summarize(&ideas, &actions, &voice))
    }

    /// Landing-page idea counts, visible without signing in.
    #[must_use]
    pub fn public_summary(&self) -> PublicSummary {
        let ideas: Vec<Idea> = or_empty(self.load());
        PublicSummary::from_ideas(&ideas)
    }

    // -- shared -----------------------------------------------------------

    fn load<R: Record>(&self) -> Result<Vec<R>> {
        let docs = self.store.fetch_all(R::COLLECTION)?;
        debug!(collection = %R::COLLECTION, count = docs.len(), "loaded snapshot");
        docs.into_iter().map(R::from_document).collect()
    }

    fn list<R: Tracked>(&self, status_filter: &StatusFilter<R::Status>) -> Result<Vec<R>> {
        let snapshot: Vec<R> = self.load()?;
        Ok(filter::apply(&snapshot, status_filter)
            .into_iter()
            .cloned()
            .collect())
    }

    fn find<R: Record>(&self, id: &str) -> Result<R> {
        self.load::<R>()?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| BoardError::NotFound {
                collection: R::COLLECTION.as_str(),
                id: id.to_string(),
            })
    }

    fn create<R: Record, D: Serialize>(&mut self, draft: D) -> Result<R> {
        let mut fields = to_fields(&draft)?;
        fields.insert(UPDATED_AT_FIELD.to_string(), timestamp_value(Utc::now()));
        let doc = self.store.append(R::COLLECTION, fields)?;
        let record = R::from_document(doc)?;
        info!(collection = %R::COLLECTION, id = record.id(), "created record");
        Ok(record)
    }

    fn advance<R: Tracked>(&mut self, caller: &Caller, id: &str, target: R::Status) -> Result<R> {
        require(caller.capability().can_mutate(), "change status")?;
        let mut record: R = self.find(id)?;
        check_transition(record.status(), target)?;

        let now = Utc::now();
        let mut patch = Fields::new();
        patch.insert(STATUS_FIELD.to_string(), Value::String(target.label().to_string()));
        patch.insert(UPDATED_AT_FIELD.to_string(), timestamp_value(now));
        self.store.patch(R::COLLECTION, id, patch)?;
        record.set_status(target, now);
        info!(collection = %R::COLLECTION, %id, status = %target, "advanced status");
        Ok(record)
    }

    fn delete<R: Tracked>(&mut self, caller: &Caller, id: &str) -> Result<()> {
        require(caller.capability().can_mutate(), "delete records")?;
        let record: R = self.find(id)?;
        let status = record.status();
        if !R::deletable_at(status) {
            return Err(BoardError::DeleteNotOffered {
                id: id.to_string(),
                status: status.label(),
            });
        }
        self.store.delete(R::COLLECTION, id)?;
        info!(collection = %R::COLLECTION, %id, "deleted record");
        Ok(())
    }
}

fn require(allowed: bool, operation: &'static str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(BoardError::Unauthenticated(operation))
    }
}

fn or_empty<T>(loaded: Result<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|error| {
        warn!(%error, "store read failed; showing an empty list");
        Vec::new()
    })
}

fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(BoardError::StoreUnavailable(format!(
            "record body must be an object, got {other}"
        ))),
    }
}

fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(format_timestamp(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn signed_in() -> Caller {
        Caller::signed_in("admin@union.org")
    }

    #[test]
    fn created_idea_carries_defaults_and_timestamps() {
        let mut board = Board::new(MemoryStore::new());
        let idea = board
            .create_idea(&signed_in(), NewIdea::new("Ana", "Lockers on deck 2"))
            .expect("create");
        assert!(idea.id.starts_with("id-"));
        assert_eq!(idea.status, IdeaStatus::New);
        assert!(idea.updated_at >= idea.created_at - chrono::Duration::seconds(1));
    }

    #[test]
    fn transition_patches_only_status_and_updated_at() {
        let mut board = Board::new(MemoryStore::new());
        let caller = signed_in();
        let idea = board
            .create_idea(&caller, NewIdea::new("Ana", "Lockers"))
            .expect("create");

        board
            .advance_idea(&caller, &idea.id, IdeaStatus::UnderReview)
            .expect("advance");
        let stored = board.idea(&idea.id).expect("reload");
        assert_eq!(stored.status, IdeaStatus::UnderReview);
        assert_eq!(stored.author, idea.author);
        assert_eq!(stored.priority, idea.priority);
        assert_eq!(stored.created_at, idea.created_at);
    }

    #[test]
    fn action_delete_is_offered_only_when_done() {
        let mut board = Board::new(MemoryStore::new());
        let caller = signed_in();
        let action = board
            .create_action(&caller, NewAction::new("Rally", "Board", "Gate 1 at 7am"))
            .expect("create");

        let err = board
            .delete_action(&caller, &action.id)
            .expect_err("planning is not deletable");
        assert!(matches!(err, BoardError::DeleteNotOffered { status: "Planning", .. }));

        board
            .advance_action(&caller, &action.id, ActionStatus::InProgress)
            .expect("step 1");
        board
            .advance_action(&caller, &action.id, ActionStatus::Done)
            .expect("step 2");
        board.delete_action(&caller, &action.id).expect("delete");
        assert!(matches!(
            board.action(&action.id),
            Err(BoardError::NotFound { .. })
        ));
    }

    #[test]
    fn ideas_delete_at_any_status() {
        let mut board = Board::new(MemoryStore::new());
        let caller = signed_in();
        let idea = board
            .create_idea(&caller, NewIdea::new("Ana", "Lockers"))
            .expect("create");
        board.delete_idea(&caller, &idea.id).expect("delete at New");
    }

    #[test]
    fn configured_anonymous_label_is_used() {
        let mut board = Board::new(MemoryStore::new()).with_anonymous_label("Anônimo");
        let message = board
            .submit_voice(NewVoiceMessage::new(None, "hello"))
            .expect("submit");
        assert_eq!(message.sender_name, "Anônimo");
    }

    #[test]
    fn blank_anonymous_label_falls_back_to_default() {
        for label in ["", "   "] {
            let mut board = Board::new(MemoryStore::new()).with_anonymous_label(label);
            let message = board
                .submit_voice(NewVoiceMessage::new(None, "hi"))
                .expect("submit");
            assert_eq!(message.sender_name, ANONYMOUS_SENDER);
        }

        let board = Board::new(MemoryStore::new()).with_anonymous_label("  Anônimo ");
        assert_eq!(board.anonymous_label, "Anônimo");
    }

    #[test]
    fn unavailable_store_degrades_reads_but_fails_writes() {
        let mut board = Board::new(MemoryStore::new());
        board.store_mut().set_unavailable(true);

        assert!(board.list_ideas_or_empty(&StatusFilter::All).is_empty());
        assert_eq!(board.public_summary().total_ideas, 0);
        assert!(board.list_ideas(&StatusFilter::All).is_err());

        let err = board
            .create_idea(&signed_in(), NewIdea::new("Ana", "Lockers"))
            .expect_err("write fails");
        assert!(err.is_store_failure());
    }
}
