//! HTTP client for the remote video QA service.

pub mod client;
pub mod error;

pub use client::{AskRequest, VideoQaApi, VideoQaClient, VideoQaClientBuilder};
pub use error::ApiError;
