//! Upload response DTO.

use serde::{Deserialize, Serialize};

/// Result of `POST /api/upload/video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Server-generated unique file name.
    pub filename: String,
    /// Server-side path to store on the manual as `video_file_path`.
    pub file_path: String,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}
