pub mod api;
pub mod citations;
pub mod models;
pub mod nav;
pub mod notify;
pub mod render;
pub mod session;
pub mod settings;
pub mod store;
pub mod tui;

pub use api::{ApiError, AskRequest, VideoQaApi, VideoQaClient, VideoQaClientBuilder};
pub use models::{ContextUnit, QaId, QaItem, QaItemBuilder, Video, VideoId, Workspace, WorkspaceId};
pub use session::{QaSession, SessionState};
pub use settings::{AskSettings, VideoSelection};
pub use store::Store;
