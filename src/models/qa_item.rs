use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ContextUnit, QaId, WorkspaceId};

/// A completed question/answer exchange within a workspace.
///
/// Items are created only as the result of a successful ask and destroyed by
/// explicit user delete. The answer is markdown that may contain citation
/// markers `[n]` referencing `source_contexts[n-1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaItem {
    /// Server-assigned identifier.
    pub id: QaId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// The question as submitted (trimmed).
    pub question: String,
    /// Generated answer, markdown with optional `[n]` citation markers.
    pub answer: String,
    /// Ordered evidence list the citation markers index into (1-based).
    pub source_contexts: Vec<ContextUnit>,
    /// When the exchange was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Server-measured generation time in seconds, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

/// Builder for constructing `QaItem` instances with optional fields.
///
/// # Examples
///
/// ```
/// use vidqa::models::QaItemBuilder;
///
/// let item = QaItemBuilder::new()
///     .id("qa-1")
///     .workspace_id("ws-1")
///     .question("What is discussed?")
///     .answer("A summary [1].")
///     .build();
///
/// assert_eq!(item.question, "What is discussed?");
/// assert!(item.source_contexts.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct QaItemBuilder {
    id: Option<QaId>,
    workspace_id: Option<WorkspaceId>,
    question: Option<String>,
    answer: Option<String>,
    source_contexts: Option<Vec<ContextUnit>>,
    created_at: Option<OffsetDateTime>,
    response_time: Option<f64>,
}

impl QaItemBuilder {
    /// Creates a new `QaItemBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the item id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(QaId::new(id));
        self
    }

    /// Sets the owning workspace id.
    pub fn workspace_id(mut self, id: impl Into<String>) -> Self {
        self.workspace_id = Some(WorkspaceId::new(id));
        self
    }

    /// Sets the question text.
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Sets the answer text.
    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Sets the ordered evidence list.
    pub fn source_contexts(mut self, contexts: Vec<ContextUnit>) -> Self {
        self.source_contexts = Some(contexts);
        self
    }

    /// Sets the created timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the server-reported response time in seconds.
    pub fn response_time(mut self, seconds: f64) -> Self {
        self.response_time = Some(seconds);
        self
    }

    /// Builds the `QaItem`, using defaults for optional fields.
    ///
    /// # Panics
    ///
    /// Panics if `id`, `workspace_id`, `question`, or `answer` have not been set.
    pub fn build(self) -> QaItem {
        QaItem {
            id: self.id.expect("id is required"),
            workspace_id: self.workspace_id.expect("workspace_id is required"),
            question: self.question.expect("question is required"),
            answer: self.answer.expect("answer is required"),
            source_contexts: self.source_contexts.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
            response_time: self.response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoId;

    #[test]
    fn builder_creates_item_with_default_empty_contexts() {
        let item = QaItemBuilder::new()
            .id("qa-1")
            .workspace_id("ws-1")
            .question("Q?")
            .answer("A.")
            .build();

        assert_eq!(item.id, QaId::new("qa-1"));
        assert!(item.source_contexts.is_empty());
        assert_eq!(item.response_time, None);
    }

    #[test]
    fn builder_allows_setting_all_fields() {
        let now = OffsetDateTime::now_utc();
        let context = ContextUnit {
            id: "ctx-1".to_string(),
            video_id: VideoId::new("vid-1"),
            video_path: "data/videos/ws-1/clip.mp4".to_string(),
            text: "excerpt".to_string(),
            start_time: 1.0,
            end_time: 2.0,
        };

        let item = QaItemBuilder::new()
            .id("qa-2")
            .workspace_id("ws-1")
            .question("Q?")
            .answer("A [1].")
            .source_contexts(vec![context.clone()])
            .created_at(now)
            .response_time(1.42)
            .build();

        assert_eq!(item.created_at, now);
        assert_eq!(item.source_contexts, vec![context]);
        assert_eq!(item.response_time, Some(1.42));
    }

    #[test]
    fn item_serialization_roundtrip() {
        let item = QaItemBuilder::new()
            .id("qa-3")
            .workspace_id("ws-1")
            .question("Q?")
            .answer("A [1].")
            .build();

        let json = serde_json::to_string(&item).unwrap();
        let deserialized: QaItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }

    #[test]
    fn missing_response_time_deserializes_as_none() {
        let json = r#"{
            "id": "qa-4",
            "workspace_id": "ws-1",
            "question": "Q?",
            "answer": "A.",
            "source_contexts": [],
            "created_at": "2026-01-15T10:30:00Z"
        }"#;

        let item: QaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.response_time, None);
    }
}
