//! Torisetsu (manual group) entity model and DTOs.

use serde::{Deserialize, Serialize};

use crate::types::{timestamp, EntityId, Timestamp};

/// A named group of manuals inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torisetsu {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_count: Option<i64>,
}

/// DTO for creating a new torisetsu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTorisetsu {
    pub project_id: EntityId,
    pub name: String,
}

/// DTO for renaming a torisetsu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTorisetsu {
    pub name: String,
}
