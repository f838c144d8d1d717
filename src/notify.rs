//! Uniform user feedback for mutating operations.
//!
//! Every state-changing call goes through [`run_mutation`], which emits a
//! single transient notice describing the outcome. The notice channel is an
//! explicit [`Notifier`] handle injected at each call site rather than
//! process-wide state, so holding a `Notifier` is a constructor precondition
//! and there is no initialization-order hazard.

use std::fmt;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Fallback text when a failure carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    /// Creates a success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Creates an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sending half of the notice channel.
///
/// Cheap to clone; worker threads carry their own handle. When the receiving
/// side has been dropped, notices are silently discarded rather than
/// panicking the sender.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Sender<Notice>,
}

impl Notifier {
    /// Creates a notifier and the receiver that drains its notices.
    pub fn new() -> (Self, Receiver<Notice>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }

    /// Emits a success notice.
    pub fn success(&self, message: impl Into<String>) {
        let _ = self.tx.send(Notice::success(message));
    }

    /// Emits an error notice.
    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.send(Notice::error(message));
    }
}

/// Runs a mutating operation with uniform outcome reporting.
///
/// The operation is invoked exactly once; a failed attempt is terminal and
/// the caller must re-invoke explicitly. On success a notice is emitted only
/// when `success_message` was supplied. On failure the error's display text
/// is emitted, falling back to a generic message when it is empty. The
/// untouched result is returned so the caller can run its own success or
/// failure logic afterwards.
pub fn run_mutation<T, E, F>(
    notifier: &Notifier,
    success_message: Option<&str>,
    op: F,
) -> Result<T, E>
where
    E: fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    match op() {
        Ok(value) => {
            if let Some(message) = success_message {
                notifier.success(message);
            }
            Ok(value)
        }
        Err(err) => {
            let message = err.to_string();
            if message.is_empty() {
                notifier.error(UNKNOWN_ERROR_MESSAGE);
            } else {
                notifier.error(message);
            }
            Err(err)
        }
    }
}
