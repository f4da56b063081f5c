//! User-facing notices.
//!
//! Every outcome the user should see goes through [`Notice`]. The scope
//! decides presentation: [`NoticeScope::Transient`] for outcomes of
//! background or asynchronous work (shown briefly and dismissed),
//! [`NoticeScope::Form`] for validation tied to an input (shown inline
//! until the input changes).

use serde::{Deserialize, Serialize};
use torisetsu_core::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeScope {
    Transient,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub scope: NoticeScope,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            scope: NoticeScope::Transient,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            scope: NoticeScope::Transient,
            message: message.into(),
        }
    }

    /// A failed asynchronous action.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            scope: NoticeScope::Transient,
            message: message.into(),
        }
    }

    /// A validation failure bound to a form input.
    pub fn form_error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            scope: NoticeScope::Form,
            message: message.into(),
        }
    }

    /// Map a domain error: validation problems belong to the form, all
    /// others are transient.
    pub fn from_core_error(err: &CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::form_error(msg.clone()),
            other => Self::error(other.to_string()),
        }
    }

    /// How long a notice stays visible, in milliseconds. Form notices stay
    /// until dismissed.
    pub fn display_millis(&self) -> Option<u64> {
        match (self.scope, self.kind) {
            (NoticeScope::Form, _) => None,
            (NoticeScope::Transient, NoticeKind::Error) => Some(6000),
            (NoticeScope::Transient, NoticeKind::Success) => Some(5000),
            (NoticeScope::Transient, NoticeKind::Info) => Some(3000),
        }
    }
}
