//! Notices — the user-visible outcome of a failed or noteworthy action.
//!
//! DESIGN
//! ======
//! Nothing inside a cycle is allowed to abort the session. Service errors are
//! typed (`thiserror`) and carry a grepable code through [`ErrorCode`]; the
//! orchestrator turns each one into a [`Notice`] and moves on to the next
//! step. Hosts decide how (or whether) to show them.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use serde::{Deserialize, Serialize};

/// Code for input that was rejected and had no effect.
pub const E_REJECTED: &str = "E_REJECTED";

/// Code for operations on an unknown record.
pub const E_NOT_FOUND: &str = "E_NOT_FOUND";

/// Code for a durable store that could not be reached.
pub const E_PERSISTENCE: &str = "E_PERSISTENCE";

/// Code for a missing or saturated audio backend.
pub const E_AUDIO_UNAVAILABLE: &str = "E_AUDIO_UNAVAILABLE";

/// Grepable error code and retryable flag for structured notices.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A message for the user produced during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    pub retryable: bool,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, code: None, message: message.into(), retryable: false }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, code: None, message: message.into(), retryable: false }
    }

    /// Build an error notice from a typed error.
    #[must_use]
    pub fn error_from(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self {
            level: NoticeLevel::Error,
            code: Some(err.error_code().to_string()),
            message: err.to_string(),
            retryable: err.retryable(),
        }
    }

    /// Error notice with a caller-chosen message, keeping the error's code.
    #[must_use]
    pub fn error_with(err: &(impl ErrorCode + ?Sized), message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            code: Some(err.error_code().to_string()),
            message: message.into(),
            retryable: err.retryable(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
