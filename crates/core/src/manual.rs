//! Manual status, structured content and steps.
//!
//! Manual content is produced by the external AI service and is only
//! loosely typed: every field is optional on the wire and unknown keys are
//! carried through untouched so that a save never drops data the client
//! does not understand.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Manual status
// ---------------------------------------------------------------------------

/// Lifecycle status of a manual.
///
/// `draft -> processing -> completed | failed` is the generation path;
/// `review` and `published` are editorial states set by the owner.
///
/// Decoding is lenient: a status string the client does not recognise
/// becomes [`ManualStatus::Unknown`] instead of failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualStatus {
    Draft,
    Review,
    Published,
    Processing,
    Completed,
    Failed,
    /// Any status string outside the known set. Never sent back.
    Unknown,
}

/// Label shown for a status string the client does not recognise.
pub const UNKNOWN_STATUS_LABEL: &str = "不明";

impl ManualStatus {
    /// Parse a status string as returned by the backend.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "published" => Ok(Self::Published),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid manual status '{s}'. Must be one of: draft, review, published, processing, completed, failed"
            ))),
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Published => "published",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "下書き",
            Self::Review => "レビュー中",
            Self::Published => "公開済み",
            Self::Processing => "生成中",
            Self::Completed => "完成",
            Self::Failed => "失敗",
            Self::Unknown => UNKNOWN_STATUS_LABEL,
        }
    }

    /// Display label for a raw status string, falling back to
    /// [`UNKNOWN_STATUS_LABEL`].
    pub fn label_for(raw: &str) -> &'static str {
        Self::from_str_db(raw)
            .map(|s| s.label())
            .unwrap_or(UNKNOWN_STATUS_LABEL)
    }

    /// Whether the backend sent a status this client understands.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Whether generation is still running server-side.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

impl<'de> Deserialize<'de> for ManualStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str_db(&raw).unwrap_or(Self::Unknown))
    }
}

impl std::fmt::Display for ManualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// One instruction unit of a manual, optionally anchored to a video offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub screen: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub verification: String,
    /// `M:SS` offset into the source video. Empty means untimed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl Step {
    /// An empty step as appended by the editor.
    pub fn blank() -> Self {
        Self {
            time: Some(String::new()),
            ..Default::default()
        }
    }

    /// A step with a title, action and timestamp.
    pub fn timed(title: impl Into<String>, action: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: action.into(),
            time: Some(time.into()),
            ..Default::default()
        }
    }

    /// The timestamp, if one is set and non-empty.
    pub fn time_str(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether the step is anchored to a video offset.
    pub fn is_timed(&self) -> bool {
        self.time_str().is_some()
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Structured manual body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub prerequisites: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub troubleshooting: String,
    #[serde(default)]
    pub additional_info: String,
    #[serde(default)]
    pub raw_content: String,
    /// Keys the client does not model, preserved on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ManualContent {
    /// Content holding only the given steps.
    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }
}

/// Deserialize manual content leniently: anything that is not a JSON object
/// of the expected shape (a bare string, a number, `null`) becomes `None`.
pub fn deserialize_lenient_content<'de, D>(deserializer: D) -> Result<Option<ManualContent>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ serde_json::Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The manual fields sent alongside content on every save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualHeader {
    pub id: EntityId,
    pub title: String,
    pub status: ManualStatus,
    pub version: String,
}

/// Version assumed when the backend omits one.
pub const DEFAULT_MANUAL_VERSION: &str = "1.0";
