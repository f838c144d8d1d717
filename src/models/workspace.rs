use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::WorkspaceId;

/// A named container scoping a set of videos and their QA history.
///
/// The summary counts are displayed in the workspace list; they are part of
/// why a successful ask must invalidate the cached workspace list as well as
/// the QA history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Server-assigned identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// When the workspace was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the workspace was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Number of recorded Q&A exchanges, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_count: Option<u64>,
    /// Number of videos, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_deserializes_without_counts() {
        let json = r#"{
            "id": "ws-1",
            "name": "Lectures",
            "created_at": "2026-01-15T10:30:00Z",
            "updated_at": "2026-01-16T09:00:00Z"
        }"#;

        let workspace: Workspace = serde_json::from_str(json).unwrap();
        assert_eq!(workspace.name, "Lectures");
        assert_eq!(workspace.qa_count, None);
        assert_eq!(workspace.video_count, None);
    }

    #[test]
    fn workspace_roundtrips_with_counts() {
        let workspace = Workspace {
            id: WorkspaceId::new("ws-2"),
            name: "Research".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
            qa_count: Some(7),
            video_count: Some(3),
        };

        let json = serde_json::to_string(&workspace).unwrap();
        let deserialized: Workspace = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.qa_count, Some(7));
        assert_eq!(deserialized.video_count, Some(3));
    }
}
