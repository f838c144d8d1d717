/// Video QA service HTTP client implementation.
///
/// This module provides `VideoQaClient` for making synchronous HTTP requests
/// to the QA backend, along with the `VideoQaApi` trait used to mock the
/// service in tests and the request type for the ask operation.
use reqwest::blocking::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use crate::api::error::{ApiError, extract_detail};
use crate::models::{QaId, QaItem, Video, VideoId, Workspace, WorkspaceId};
use crate::settings::AskSettings;

/// Default backend location when neither the builder nor the environment
/// configures one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// The full ask-question payload.
///
/// The settings bundle is forwarded opaquely; the client never interprets
/// retriever or generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    #[serde(skip)]
    pub workspace_id: WorkspaceId,
    pub question: String,
    pub video_ids: Vec<VideoId>,
    #[serde(flatten)]
    pub settings: AskSettings,
}

/// Trait for video QA service operations.
///
/// This trait enables mocking in unit tests and provides a clean interface
/// for the session layer and the TUI.
pub trait VideoQaApi: Send + Sync {
    /// Submits a question scoped to the selected videos and returns the
    /// recorded exchange.
    fn ask_question(&self, request: &AskRequest) -> Result<QaItem, ApiError>;

    /// Fetches the workspace's QA history, chronological, oldest first.
    fn get_history(&self, workspace_id: &WorkspaceId) -> Result<Vec<QaItem>, ApiError>;

    /// Deletes a single recorded exchange.
    fn delete_item(&self, workspace_id: &WorkspaceId, qa_id: &QaId) -> Result<(), ApiError>;

    /// Deletes the workspace's entire QA history.
    fn delete_all_history(&self, workspace_id: &WorkspaceId) -> Result<(), ApiError>;

    /// Lists all workspaces.
    fn get_workspaces(&self) -> Result<Vec<Workspace>, ApiError>;

    /// Fetches a single workspace.
    fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, ApiError>;

    /// Lists the workspace's videos.
    fn get_videos(&self, workspace_id: &WorkspaceId) -> Result<Vec<Video>, ApiError>;
}

/// Builder for constructing `VideoQaClient` instances.
///
/// # Examples
///
/// ```
/// use vidqa::api::VideoQaClientBuilder;
///
/// let client = VideoQaClientBuilder::new()
///     .base_url("http://localhost:8000")
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct VideoQaClientBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
}

impl VideoQaClientBuilder {
    /// Creates a new `VideoQaClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the QA backend.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the bearer token forwarded with every request.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Builds the `VideoQaClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, this method checks the `VIDQA_API_URL`
    /// environment variable, then falls back to `http://localhost:8000`.
    /// Likewise `access_token()` falls back to `VIDQA_ACCESS_TOKEN`; with
    /// neither set, requests carry no Authorization header.
    ///
    /// No client-side timeout is configured: transport defaults apply, since
    /// ask requests can legitimately take as long as generation does.
    pub fn build(self) -> Result<VideoQaClient, ApiError> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            std::env::var("VIDQA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
        };

        let access_token = self
            .access_token
            .or_else(|| std::env::var("VIDQA_ACCESS_TOKEN").ok());

        reqwest::Url::parse(&base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(ApiError::Network)?;

        Ok(VideoQaClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }
}

/// Synchronous HTTP client for the video QA backend.
///
/// Construct with `VideoQaClientBuilder`. The client is `Send + Sync` and is
/// shared across worker threads behind an `Arc` by the TUI.
pub struct VideoQaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    access_token: Option<String>,
}

impl VideoQaClient {
    /// Returns the base URL configured for this client.
    ///
    /// Also serves as the static-asset base for playback deep links.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Converts an error-status response into `ApiError::Request`, pulling
    /// the message out of the structured `detail` body when possible.
    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let message = response
            .json::<Value>()
            .ok()
            .as_ref()
            .and_then(extract_detail)
            .unwrap_or_else(|| format!("Request failed with status {code}"));

        Err(ApiError::Request {
            status: code,
            message,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.client.get(self.api_url(path)))
            .send()
            .map_err(ApiError::Network)?;
        Self::check(response)?.json().map_err(ApiError::Decode)
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .authorize(self.client.delete(self.api_url(path)))
            .send()
            .map_err(ApiError::Network)?;
        Self::check(response)?;
        Ok(())
    }
}

impl VideoQaApi for VideoQaClient {
    fn ask_question(&self, request: &AskRequest) -> Result<QaItem, ApiError> {
        let path = format!("/workspaces/{}/ask", request.workspace_id);
        let response = self
            .authorize(self.client.post(self.api_url(&path)).json(request))
            .send()
            .map_err(ApiError::Network)?;
        Self::check(response)?.json().map_err(ApiError::Decode)
    }

    fn get_history(&self, workspace_id: &WorkspaceId) -> Result<Vec<QaItem>, ApiError> {
        self.get_json(&format!("/workspaces/{workspace_id}/history"))
    }

    fn delete_item(&self, workspace_id: &WorkspaceId, qa_id: &QaId) -> Result<(), ApiError> {
        self.delete(&format!("/workspaces/{workspace_id}/history/{qa_id}"))
    }

    fn delete_all_history(&self, workspace_id: &WorkspaceId) -> Result<(), ApiError> {
        self.delete(&format!("/workspaces/{workspace_id}/history"))
    }

    fn get_workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        self.get_json("/workspaces")
    }

    fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, ApiError> {
        self.get_json(&format!("/workspaces/{workspace_id}"))
    }

    fn get_videos(&self, workspace_id: &WorkspaceId) -> Result<Vec<Video>, ApiError> {
        self.get_json(&format!("/workspaces/{workspace_id}/videos"))
    }
}
