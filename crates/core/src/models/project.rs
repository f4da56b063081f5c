//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};

use crate::types::{timestamp, EntityId, Timestamp};

/// Top-level container owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub creator_id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: Timestamp,
    /// Number of torisetsu, filled by list/detail endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torisetsu_count: Option<i64>,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
