use serde::{Deserialize, Serialize};

use super::VideoId;

/// A timestamped text excerpt from a specific video, used as retrieval
/// evidence for an answer.
///
/// Context units are created server-side at ingestion time and are immutable
/// once attached to a [`QaItem`](super::QaItem). A citation marker `[n]`
/// inside an answer refers to `source_contexts[n-1]` of the same item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextUnit {
    /// Server-assigned identifier.
    pub id: String,
    /// The video this excerpt was taken from.
    pub video_id: VideoId,
    /// Relative media path of the source video.
    pub video_path: String,
    /// The excerpt text.
    pub text: String,
    /// Start of the excerpt within the video, in seconds.
    pub start_time: f64,
    /// End of the excerpt within the video, in seconds.
    pub end_time: f64,
}
