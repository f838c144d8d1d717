//! Question lifecycle for a workspace's conversation view.
//!
//! A session is a small state machine with two states, idle and submitting.
//! At most one ask is in flight per session; submission is guarded
//! synchronously on the state, so a second submit attempt while one is
//! pending is rejected before any request is built.
//!
//! Responses that arrive after the session has been replaced (the user
//! switched workspaces) are not lost: the owner routes them into a
//! per-workspace history cache keyed by the workspace id carried alongside
//! the result. Only the notice for a torn-down session's failure is dropped
//! with it, which is acceptable for a transient message.

use crate::api::AskRequest;
use crate::models::{QaItem, VideoId, WorkspaceId};
use crate::settings::AskSettings;

/// Whether an ask is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
}

/// What a completed ask made stale.
///
/// A successful ask invalidates the history (a new exchange exists) and the
/// workspace summaries (the workspace's QA count changed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidations {
    pub qa_history: bool,
    pub workspace_summary: bool,
}

impl Invalidations {
    pub const NONE: Self = Self {
        qa_history: false,
        workspace_summary: false,
    };
}

/// Conversation state for one workspace.
#[derive(Debug)]
pub struct QaSession {
    workspace_id: WorkspaceId,
    state: SessionState,
    pending: Option<String>,
    history: Vec<QaItem>,
}

impl QaSession {
    /// Creates an idle session with no loaded history.
    pub fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            state: SessionState::Idle,
            pending: None,
            history: Vec::new(),
        }
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The question currently awaiting an answer, shown as a placeholder
    /// exchange at the end of the conversation.
    pub fn pending_question(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// The loaded history, chronological, oldest first.
    pub fn history(&self) -> &[QaItem] {
        &self.history
    }

    /// Replaces the loaded history.
    pub fn set_history(&mut self, history: Vec<QaItem>) {
        self.history = history;
    }

    /// Attempts to begin submitting a question.
    ///
    /// Returns the request to dispatch, or `None` when submission is not
    /// possible: the question is empty after trimming, no videos are
    /// selected, or an ask is already in flight. On success the session
    /// moves to `Submitting` and records the pending question.
    pub fn begin_submit(
        &mut self,
        question: &str,
        video_ids: &[VideoId],
        settings: &AskSettings,
    ) -> Option<AskRequest> {
        let question = question.trim();
        if question.is_empty() || video_ids.is_empty() || self.state == SessionState::Submitting {
            return None;
        }

        self.state = SessionState::Submitting;
        self.pending = Some(question.to_string());

        Some(AskRequest {
            workspace_id: self.workspace_id.clone(),
            question: question.to_string(),
            video_ids: video_ids.to_vec(),
            settings: *settings,
        })
    }

    /// Records a successful answer: appends the exchange, clears the
    /// pending placeholder, and returns to idle.
    pub fn complete_success(&mut self, item: QaItem) -> Invalidations {
        self.history.push(item);
        self.pending = None;
        self.state = SessionState::Idle;
        Invalidations {
            qa_history: true,
            workspace_summary: true,
        }
    }

    /// Records a failed ask: the pending placeholder is discarded and the
    /// session returns to idle so the user can retry. History is untouched.
    pub fn complete_failure(&mut self) {
        self.pending = None;
        self.state = SessionState::Idle;
    }

    /// Removes a deleted exchange from the loaded history.
    ///
    /// Deletion is independent of the ask state machine and is never gated
    /// on `Submitting`.
    pub fn remove_item(&mut self, qa_id: &crate::models::QaId) {
        self.history.retain(|item| &item.id != qa_id);
    }

    /// Clears the loaded history after a delete-all.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QaId, QaItemBuilder};
    use crate::notify::{Notice, Notifier, run_mutation};

    fn session() -> QaSession {
        QaSession::new(WorkspaceId::new("ws-1"))
    }

    fn answered(id: &str, question: &str) -> QaItem {
        QaItemBuilder::new()
            .id(id)
            .workspace_id("ws-1")
            .question(question)
            .answer("The answer. [1]")
            .build()
    }

    #[test]
    fn begin_submit_builds_request_and_enters_submitting() {
        let mut session = session();
        let videos = vec![VideoId::new("vid-1")];

        let request = session
            .begin_submit("  What is covered?  ", &videos, &AskSettings::default())
            .expect("submit should be accepted");

        assert_eq!(request.question, "What is covered?");
        assert_eq!(request.workspace_id, WorkspaceId::new("ws-1"));
        assert_eq!(session.state(), SessionState::Submitting);
        assert_eq!(session.pending_question(), Some("What is covered?"));
    }

    #[test]
    fn whitespace_only_question_is_rejected() {
        let mut session = session();
        let videos = vec![VideoId::new("vid-1")];
        assert!(session.begin_submit("   \n  ", &videos, &AskSettings::default()).is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn empty_video_selection_is_rejected() {
        let mut session = session();
        assert!(session.begin_submit("Q?", &[], &AskSettings::default()).is_none());
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut session = session();
        let videos = vec![VideoId::new("vid-1")];

        assert!(session.begin_submit("first", &videos, &AskSettings::default()).is_some());
        assert!(session.begin_submit("second", &videos, &AskSettings::default()).is_none());
        // The original pending question is untouched
        assert_eq!(session.pending_question(), Some("first"));
    }

    #[test]
    fn success_appends_answer_and_returns_to_idle() {
        let mut session = session();
        let videos = vec![VideoId::new("vid-1")];
        session.begin_submit("Q?", &videos, &AskSettings::default());

        let invalidations = session.complete_success(answered("qa-1", "Q?"));

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.pending_question().is_none());
        assert_eq!(session.history().len(), 1);
        assert!(invalidations.qa_history);
        assert!(invalidations.workspace_summary);
    }

    #[test]
    fn failure_discards_pending_and_allows_retry() {
        let mut session = session();
        let videos = vec![VideoId::new("vid-1")];
        session.begin_submit("Q?", &videos, &AskSettings::default());

        session.complete_failure();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.pending_question().is_none());
        assert!(session.history().is_empty());
        // Retry is a fresh explicit submit
        assert!(session.begin_submit("Q?", &videos, &AskSettings::default()).is_some());
    }

    #[test]
    fn remove_item_drops_only_the_deleted_exchange() {
        let mut session = session();
        session.set_history(vec![answered("qa-1", "first"), answered("qa-2", "second")]);

        session.remove_item(&QaId::new("qa-1"));

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].id, QaId::new("qa-2"));
    }

    #[test]
    fn clear_history_empties_the_conversation() {
        let mut session = session();
        session.set_history(vec![answered("qa-1", "first")]);
        session.clear_history();
        assert!(session.history().is_empty());
    }

    #[test]
    fn ask_through_run_mutation_emits_no_success_notice() {
        let (notifier, rx) = Notifier::new();
        let mut session = session();
        let videos = vec![VideoId::new("vid-1")];
        let request = session
            .begin_submit("Q?", &videos, &AskSettings::default())
            .unwrap();

        // The answer itself is the success feedback for an ask
        let result = run_mutation(&notifier, None, || {
            Ok::<_, crate::api::ApiError>(answered("qa-1", &request.question))
        });

        session.complete_success(result.unwrap());
        assert!(rx.try_recv().is_err());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn failed_ask_emits_one_error_notice_and_preserves_history() {
        let (notifier, rx) = Notifier::new();
        let mut session = session();
        session.set_history(vec![answered("qa-1", "earlier")]);
        let videos = vec![VideoId::new("vid-1")];
        session.begin_submit("Q?", &videos, &AskSettings::default());

        let result: Result<QaItem, crate::api::ApiError> = run_mutation(&notifier, None, || {
            Err(crate::api::ApiError::Request {
                status: 502,
                message: "Generator unavailable".to_string(),
            })
        });

        assert!(result.is_err());
        session.complete_failure();

        assert_eq!(rx.try_recv().unwrap(), Notice::error("Generator unavailable"));
        assert!(rx.try_recv().is_err(), "exactly one notice expected");
        assert_eq!(session.history().len(), 1);
    }
}
