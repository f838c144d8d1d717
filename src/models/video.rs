use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{VideoId, WorkspaceId};

/// A video belonging to a workspace.
///
/// Videos are ingested server-side; the client only reads them to drive the
/// sources panel and the playback deep links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Server-assigned identifier.
    pub id: VideoId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Original filename, used as the display title.
    pub filename: String,
    /// Relative media path on the server.
    pub file_path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Duration in seconds.
    pub duration: f64,
    /// Server-side ingestion status, forwarded opaquely.
    pub processing_status: String,
    /// When the video was added.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When ingestion finished, if it has.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub processed_at: Option<OffsetDateTime>,
}
