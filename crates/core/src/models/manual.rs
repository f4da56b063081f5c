//! Manual entity model and DTOs.

use serde::{Deserialize, Serialize};

use crate::manual::{
    deserialize_lenient_content, ManualContent, ManualHeader, ManualStatus, Step,
    DEFAULT_MANUAL_VERSION,
};
use crate::types::{timestamp, EntityId, Timestamp};

fn default_version() -> String {
    DEFAULT_MANUAL_VERSION.to_string()
}

/// A manual as returned by the manual endpoints.
///
/// Older backends key manuals by `project_id`, current ones by
/// `torisetsu_id`; whichever is present is the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manual {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torisetsu_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_lenient_content")]
    pub content: Option<ManualContent>,
    pub status: ManualStatus,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub video_file_path: Option<String>,
    #[serde(default)]
    pub audio_file_path: Option<String>,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub share_enabled: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub share_expires_at: Option<Timestamp>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: Timestamp,
}

impl Manual {
    /// Parent id: the torisetsu, or the project for older records.
    pub fn parent_id(&self) -> Option<&str> {
        self.torisetsu_id
            .as_deref()
            .or(self.project_id.as_deref())
    }

    /// Fields sent with every content save.
    pub fn header(&self) -> ManualHeader {
        ManualHeader {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            version: self.version.clone(),
        }
    }

    /// Steps of the generated content, empty when there is none.
    pub fn steps(&self) -> &[Step] {
        self.content
            .as_ref()
            .map(|c| c.steps.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a generation run can be started for this manual: it has a
    /// video, no content yet, and is still a draft.
    pub fn needs_generation(&self) -> bool {
        self.video_file_path.as_deref().is_some_and(|p| !p.is_empty())
            && self.content.is_none()
            && self.status == ManualStatus::Draft
    }
}

/// DTO for creating a new manual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManual {
    pub torisetsu_id: EntityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ManualContent>,
    pub status: ManualStatus,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_file_path: Option<String>,
}

impl CreateManual {
    /// A draft manual in `torisetsu_id`, optionally bound to an uploaded
    /// video.
    pub fn draft(torisetsu_id: impl Into<EntityId>, title: impl Into<String>, video_file_path: Option<String>) -> Self {
        Self {
            torisetsu_id: torisetsu_id.into(),
            title: title.into(),
            content: None,
            status: ManualStatus::Draft,
            version: default_version(),
            video_file_path,
        }
    }
}

/// DTO for updating an existing manual. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateManual {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ManualContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ManualStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl UpdateManual {
    /// Full content save as issued by the step editor.
    pub fn content_save(header: &ManualHeader, content: &ManualContent) -> Self {
        Self {
            title: Some(header.title.clone()),
            content: Some(content.clone()),
            status: Some(header.status).filter(ManualStatus::is_known),
            version: Some(header.version.clone()),
        }
    }
}

/// Lightweight status check returned by `GET /api/manuals/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualStatusResponse {
    pub manual_id: EntityId,
    pub status: ManualStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub has_content: bool,
    #[serde(default)]
    pub video_file_path: Option<String>,
}

/// Acknowledgement of `POST /api/manuals/{id}/generate`. Generation runs
/// in the background; poll the status endpoint for the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStarted {
    pub manual_id: EntityId,
    pub status: ManualStatus,
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /api/manuals/{id}/share`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTokenRequest {
    pub expires_in_days: Option<u32>,
}

/// Issued share link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTokenResponse {
    pub share_token: String,
    /// Path-only URL (`/share/{token}`) as issued by the backend.
    pub share_url: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub expires_at: Option<Timestamp>,
}
