//! End-to-end QA flow tests against a mock service.
//!
//! Drives the session state machine, the mutation wrapper, and the citation
//! pipeline together the way the TUI wires them, without any network.

use std::sync::Mutex;

use vidqa::api::{ApiError, AskRequest, VideoQaApi};
use vidqa::citations::{citation_tag_label, displayed_citations};
use vidqa::models::{
    ContextUnit, QaId, QaItem, QaItemBuilder, Video, VideoId, Workspace, WorkspaceId,
};
use vidqa::notify::{Notice, NoticeLevel, Notifier, run_mutation};
use vidqa::session::{QaSession, SessionState};
use vidqa::settings::AskSettings;

/// In-memory stand-in for the QA service.
struct MockService {
    history: Mutex<Vec<QaItem>>,
    fail_next_ask: Mutex<Option<ApiError>>,
}

impl MockService {
    fn new() -> Self {
        Self {
            history: Mutex::new(Vec::new()),
            fail_next_ask: Mutex::new(None),
        }
    }

    fn fail_next_ask(&self, error: ApiError) {
        *self.fail_next_ask.lock().unwrap() = Some(error);
    }
}

impl VideoQaApi for MockService {
    fn ask_question(&self, request: &AskRequest) -> Result<QaItem, ApiError> {
        if let Some(error) = self.fail_next_ask.lock().unwrap().take() {
            return Err(error);
        }

        let mut history = self.history.lock().unwrap();
        let item = QaItemBuilder::new()
            .id(format!("qa-{}", history.len() + 1))
            .workspace_id(request.workspace_id.as_str())
            .question(&request.question)
            .answer("The course covers ownership. [1]")
            .source_contexts(vec![ContextUnit {
                id: "ctx-1".to_string(),
                video_id: request.video_ids[0].clone(),
                video_path: "data/videos/ws-1/lecture.mp4".to_string(),
                text: "ownership excerpt".to_string(),
                start_time: 125.0,
                end_time: 185.0,
            }])
            .build();
        history.push(item.clone());
        Ok(item)
    }

    fn get_history(&self, _: &WorkspaceId) -> Result<Vec<QaItem>, ApiError> {
        Ok(self.history.lock().unwrap().clone())
    }

    fn delete_item(&self, _: &WorkspaceId, qa_id: &QaId) -> Result<(), ApiError> {
        let mut history = self.history.lock().unwrap();
        let before = history.len();
        history.retain(|item| &item.id != qa_id);
        if history.len() == before {
            return Err(ApiError::Request {
                status: 404,
                message: "QA item not found".to_string(),
            });
        }
        Ok(())
    }

    fn delete_all_history(&self, _: &WorkspaceId) -> Result<(), ApiError> {
        self.history.lock().unwrap().clear();
        Ok(())
    }

    fn get_workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        Ok(Vec::new())
    }

    fn get_workspace(&self, _: &WorkspaceId) -> Result<Workspace, ApiError> {
        Err(ApiError::Unknown)
    }

    fn get_videos(&self, _: &WorkspaceId) -> Result<Vec<Video>, ApiError> {
        Ok(Vec::new())
    }
}

fn ask(
    service: &MockService,
    session: &mut QaSession,
    notifier: &Notifier,
    question: &str,
) -> Result<QaItem, ApiError> {
    let request = session
        .begin_submit(
            question,
            &[VideoId::new("vid-1")],
            &AskSettings::default(),
        )
        .expect("submit should be accepted");
    run_mutation(notifier, None, || service.ask_question(&request))
}

#[test]
fn successful_ask_flows_into_history_with_citation_tags() {
    let service = MockService::new();
    let (notifier, notices) = Notifier::new();
    let mut session = QaSession::new(WorkspaceId::new("ws-1"));

    let result = ask(&service, &mut session, &notifier, "What is covered?");
    let item = result.expect("ask should succeed");
    session.complete_success(item);

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.history().len(), 1);
    // Asking is silent on success; the answer itself is the feedback
    assert!(notices.try_recv().is_err());

    let answered = &session.history()[0];
    let citations = displayed_citations(&answered.answer, &answered.source_contexts);
    assert_eq!(citations.len(), 1);
    assert_eq!(citations[0].ordinal, 1);
    // Names longer than ten characters truncate in the tag label
    assert_eq!(
        citation_tag_label(citations[0].context),
        "lecture.mp... (02:05 - 03:05)"
    );
}

#[test]
fn failed_ask_notifies_once_and_leaves_history_untouched() {
    let service = MockService::new();
    let (notifier, notices) = Notifier::new();
    let mut session = QaSession::new(WorkspaceId::new("ws-1"));

    // One successful exchange first
    let item = ask(&service, &mut session, &notifier, "first").unwrap();
    session.complete_success(item);

    service.fail_next_ask(ApiError::Request {
        status: 502,
        message: "Generator unavailable".to_string(),
    });

    let result = ask(&service, &mut session, &notifier, "second");
    assert!(result.is_err());
    session.complete_failure();

    let notice = notices.try_recv().expect("one error notice expected");
    assert_eq!(notice, Notice::error("Generator unavailable"));
    assert!(notices.try_recv().is_err());

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn delete_announces_success_and_shrinks_history() {
    let service = MockService::new();
    let (notifier, notices) = Notifier::new();
    let mut session = QaSession::new(WorkspaceId::new("ws-1"));

    let item = ask(&service, &mut session, &notifier, "Q?").unwrap();
    let qa_id = item.id.clone();
    session.complete_success(item);

    let workspace_id = session.workspace_id().clone();
    let result = run_mutation(&notifier, Some("QA item deleted successfully!"), || {
        service.delete_item(&workspace_id, &qa_id)
    });
    assert!(result.is_ok());
    session.remove_item(&qa_id);

    assert_eq!(
        notices.try_recv().unwrap(),
        Notice::success("QA item deleted successfully!")
    );
    assert!(session.history().is_empty());
    assert!(service.get_history(&workspace_id).unwrap().is_empty());
}

#[test]
fn deleting_missing_item_surfaces_service_detail_message() {
    let service = MockService::new();
    let (notifier, notices) = Notifier::new();
    let workspace_id = WorkspaceId::new("ws-1");

    let result = run_mutation(&notifier, Some("QA item deleted successfully!"), || {
        service.delete_item(&workspace_id, &QaId::new("qa-missing"))
    });

    assert!(result.is_err());
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "QA item not found");
}

#[test]
fn delete_is_not_gated_on_an_in_flight_ask() {
    let service = MockService::new();
    let (notifier, _notices) = Notifier::new();
    let mut session = QaSession::new(WorkspaceId::new("ws-1"));

    let item = ask(&service, &mut session, &notifier, "first").unwrap();
    let qa_id = item.id.clone();
    session.complete_success(item);

    // Second ask is in flight
    session
        .begin_submit("second", &[VideoId::new("vid-1")], &AskSettings::default())
        .unwrap();
    assert_eq!(session.state(), SessionState::Submitting);

    // Deleting during submission is allowed
    let workspace_id = session.workspace_id().clone();
    assert!(service.delete_item(&workspace_id, &qa_id).is_ok());
    session.remove_item(&qa_id);
    assert!(session.history().is_empty());
    assert_eq!(session.state(), SessionState::Submitting);
}
