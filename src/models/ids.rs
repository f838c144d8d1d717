use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a workspace.
///
/// Wraps the server-assigned string id to provide type safety and prevent
/// accidental mixing of different id types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Creates a new workspace id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying id value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Creates a new video id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying id value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a Q&A exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QaId(String);

impl QaId {
    /// Creates a new Q&A id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying id value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_id_serializes_as_raw_string() {
        let id = WorkspaceId::new("ws-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ws-42\"");

        let deserialized: WorkspaceId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn video_id_serializes_as_raw_string() {
        let id = VideoId::new("vid-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"vid-1\"");

        let deserialized: VideoId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn ids_are_not_interchangeable() {
        // This test documents the type safety - these lines would fail to compile:
        // let workspace_id: WorkspaceId = VideoId::new("a"); // Error: mismatched types
        // let qa_id: QaId = WorkspaceId::new("a");           // Error: mismatched types

        let video_id = VideoId::new("same");
        let qa_id = QaId::new("same");

        // Same underlying value, but different types
        assert_eq!(video_id.as_str(), qa_id.as_str());
    }
}
