use torisetsu_core::error::CoreError;

use crate::session::SessionError;

/// Errors from the TORISETSU REST client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend rejected the credentials. The session has been cleared.
    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("authentication required"))]
    Unauthorized { detail: Option<String> },

    /// A share link whose expiry has passed (`410 Gone`).
    #[error("Share link has expired")]
    ShareExpired,

    /// Any other non-2xx response.
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or(.body.as_str()))]
    Api {
        status: u16,
        /// The response body's `detail` field, when present.
        detail: Option<String>,
        /// Raw response body for debugging.
        body: String,
    },

    /// Client-side validation failed before any request was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The session could not be persisted.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status of a rejected request, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::ShareExpired => Some(410),
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Core(_) | Self::Session(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message to show the user: the backend's `detail` or the validation
    /// message when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            }
            | Self::Unauthorized {
                detail: Some(detail),
            } => detail.clone(),
            Self::Core(CoreError::Validation(msg)) => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Pull a human-readable `detail` out of an error body.
///
/// Handles `{"detail": "..."}` and the list form used for request
/// validation failures (`{"detail": [{"msg": "..."}]}`), taking the first
/// message.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    }
}
