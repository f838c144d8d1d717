pub mod context_unit;
pub mod ids;
pub mod qa_item;
pub mod video;
pub mod workspace;

pub use context_unit::ContextUnit;
pub use ids::{QaId, VideoId, WorkspaceId};
pub use qa_item::{QaItem, QaItemBuilder};
pub use video::Video;
pub use workspace::Workspace;
