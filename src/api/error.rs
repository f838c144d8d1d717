use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the video QA service.
///
/// The `Display` output of each variant is what the notification layer shows
/// to the user, so `Request` renders its extracted message alone.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed local input, caught before any request is sent.
    #[error("{0}")]
    Validation(String),

    /// The server responded with an error status. The message is extracted
    /// from the structured `detail` field when present.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Network-related errors: no response was received.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// Invalid base URL configuration.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A failure carrying no usable message.
    #[error("An unknown error occurred.")]
    Unknown,
}

/// Extracts the user-facing message from a structured error body.
///
/// The service reports errors as `{"detail": ...}` where `detail` is either a
/// plain string or a list of `{"msg": ...}` objects, joined with `", "`.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join(", "))
            }
        }
        _ => None,
    }
}
