//! First-run setup wizard: creates a project and its first torisetsu in
//! one call.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::EntityId;

/// Longest project or torisetsu name the wizard accepts (mirrors the
/// `length` bounds below).
pub const MAX_NAME_CHARS: usize = 100;

/// Body of `POST /api/wizard/setup`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WizardSetup {
    #[validate(length(min = 1, max = 100))]
    pub project_name: String,
    #[validate(length(min = 1, max = 100))]
    pub torisetsu_name: String,
}

impl WizardSetup {
    /// Build a request from user input, trimming surrounding whitespace
    /// and validating lengths.
    pub fn new(project_name: &str, torisetsu_name: &str) -> Result<Self, CoreError> {
        let setup = Self {
            project_name: project_name.trim().to_string(),
            torisetsu_name: torisetsu_name.trim().to_string(),
        };
        setup
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        Ok(setup)
    }
}

/// Ids of the project and torisetsu created by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSetupResponse {
    pub project_id: EntityId,
    pub torisetsu_id: EntityId,
    pub project_name: String,
    pub torisetsu_name: String,
    #[serde(default)]
    pub message: String,
}
