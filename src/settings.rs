//! User-tunable ask parameters and per-workspace video selections.
//!
//! Both are persisted through the [`Store`](crate::store::Store) and loaded
//! with defaults when never written, so a fresh install behaves identically
//! to one where every setting was reset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Video, VideoId, WorkspaceId};
use crate::store::{Store, StoreError};

/// Answer generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorType {
    Gemini,
    Qwen,
}

impl fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Qwen => write!(f, "qwen"),
        }
    }
}

/// Context retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverType {
    Vector,
    Bm25,
    Hybrid,
}

impl fmt::Display for RetrieverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Bm25 => write!(f, "bm25"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Embedding model used by vector and hybrid retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingModel {
    Dangvantuan,
    Halong,
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dangvantuan => write!(f, "dangvantuan"),
            Self::Halong => write!(f, "halong"),
        }
    }
}

/// The ask-request parameter bundle.
///
/// Serializes flat into the ask request body. Forwarded opaquely by the
/// client; only the server interprets these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AskSettings {
    pub generator_type: GeneratorType,
    pub retriever_type: RetrieverType,
    pub embedding_model: EmbeddingModel,
    pub use_reranker: bool,
    pub use_history: bool,
    pub history_count: u32,
}

impl Default for AskSettings {
    fn default() -> Self {
        Self {
            generator_type: GeneratorType::Gemini,
            retriever_type: RetrieverType::Vector,
            embedding_model: EmbeddingModel::Dangvantuan,
            use_reranker: false,
            use_history: true,
            history_count: 5,
        }
    }
}

impl AskSettings {
    /// Loads settings from the store, falling back to defaults per key.
    ///
    /// Keys are stored individually so adding a setting in a later version
    /// leaves existing ones intact.
    pub fn load(store: &Store) -> Result<Self, StoreError> {
        let defaults = Self::default();
        Ok(Self {
            generator_type: store
                .get("generator_type")?
                .unwrap_or(defaults.generator_type),
            retriever_type: store
                .get("retriever_type")?
                .unwrap_or(defaults.retriever_type),
            embedding_model: store
                .get("embedding_model")?
                .unwrap_or(defaults.embedding_model),
            use_reranker: store.get("use_reranker")?.unwrap_or(defaults.use_reranker),
            use_history: store.get("use_history")?.unwrap_or(defaults.use_history),
            history_count: store
                .get("history_count")?
                .unwrap_or(defaults.history_count),
        })
    }

    /// Persists every setting under its own key.
    pub fn save(&self, store: &Store) -> Result<(), StoreError> {
        store.set("generator_type", &self.generator_type)?;
        store.set("retriever_type", &self.retriever_type)?;
        store.set("embedding_model", &self.embedding_model)?;
        store.set("use_reranker", &self.use_reranker)?;
        store.set("use_history", &self.use_history)?;
        store.set("history_count", &self.history_count)?;
        Ok(())
    }

    /// One-line summary shown in the settings footer.
    ///
    /// The embedding model only matters for retrieval strategies that embed,
    /// so it is omitted for bm25.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.generator_type.to_string(), self.retriever_type.to_string()];
        if self.retriever_type != RetrieverType::Bm25 {
            parts.push(self.embedding_model.to_string());
        }
        if self.use_reranker {
            parts.push("reranker".to_string());
        }
        if self.use_history {
            parts.push(format!("history:{}", self.history_count));
        }
        parts.join(" | ")
    }
}

/// Which of a workspace's videos are in scope for questions.
///
/// `All` is the never-customized state and tracks newly added videos
/// automatically. An explicit empty list means the user deselected
/// everything, which is a distinct state that blocks asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSelection {
    All,
    Explicit(Vec<VideoId>),
}

impl VideoSelection {
    fn key(workspace_id: &WorkspaceId) -> String {
        format!("selected_videos_{workspace_id}")
    }

    /// Loads the workspace's selection. A key that was never written means
    /// all videos are selected.
    pub fn load(store: &Store, workspace_id: &WorkspaceId) -> Result<Self, StoreError> {
        let stored: Option<Vec<VideoId>> = store.get(&Self::key(workspace_id))?;
        Ok(match stored {
            Some(ids) => Self::Explicit(ids),
            None => Self::All,
        })
    }

    /// Persists the selection. `All` removes the key so the workspace
    /// returns to the never-customized state.
    pub fn save(&self, store: &Store, workspace_id: &WorkspaceId) -> Result<(), StoreError> {
        match self {
            Self::All => store.remove(&Self::key(workspace_id)),
            Self::Explicit(ids) => store.set(&Self::key(workspace_id), ids),
        }
    }

    /// Resolves the selection against the workspace's current video list.
    ///
    /// Explicit ids that no longer exist are dropped.
    pub fn resolve(&self, videos: &[Video]) -> Vec<VideoId> {
        match self {
            Self::All => videos.iter().map(|v| v.id.clone()).collect(),
            Self::Explicit(ids) => ids
                .iter()
                .filter(|id| videos.iter().any(|v| &v.id == *id))
                .cloned()
                .collect(),
        }
    }

    /// Returns whether the given video is currently selected.
    pub fn is_selected(&self, video_id: &VideoId) -> bool {
        match self {
            Self::All => true,
            Self::Explicit(ids) => ids.contains(video_id),
        }
    }

    /// Toggles one video in or out of the selection.
    ///
    /// Toggling while in the `All` state first materializes the full list
    /// from `videos`, then removes the toggled id.
    pub fn toggle(&mut self, video_id: &VideoId, videos: &[Video]) {
        match self {
            Self::All => {
                let remaining: Vec<VideoId> = videos
                    .iter()
                    .map(|v| v.id.clone())
                    .filter(|id| id != video_id)
                    .collect();
                *self = Self::Explicit(remaining);
            }
            Self::Explicit(ids) => {
                if let Some(pos) = ids.iter().position(|id| id == video_id) {
                    ids.remove(pos);
                } else {
                    ids.push(video_id.clone());
                }
            }
        }
    }

    /// Selects every video, returning to the auto-tracking state.
    pub fn select_all(&mut self) {
        *self = Self::All;
    }

    /// Deselects every video.
    pub fn select_none(&mut self) {
        *self = Self::Explicit(Vec::new());
    }
}
