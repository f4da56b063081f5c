//! In-memory editing of a manual's step list.
//!
//! [`StepEditor`] keeps the persisted content as the source of truth and
//! edits a separate working copy. Every operation replaces the working
//! step list wholesale; nothing becomes visible outside the editor until
//! [`StepEditor::save`] succeeds.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::manual::{ManualContent, ManualHeader, Step};
use crate::time_codec::parse_time_to_seconds;

// ---------------------------------------------------------------------------
// Persistence seam
// ---------------------------------------------------------------------------

/// Destination for saved manual content (`PUT /api/manuals/{id}` in the
/// REST client).
#[async_trait]
pub trait ContentStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist `content` for the manual described by `header`.
    async fn put_content(
        &self,
        header: &ManualHeader,
        content: &ManualContent,
    ) -> Result<(), Self::Error>;
}

// ---------------------------------------------------------------------------
// Field and outcome types
// ---------------------------------------------------------------------------

/// Editable step field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Title,
    Action,
    Screen,
    Notes,
    Verification,
    Time,
}

impl StepField {
    /// Parse a field name as used in the content JSON.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "action" => Some(Self::Action),
            "screen" => Some(Self::Screen),
            "notes" => Some(Self::Notes),
            "verification" => Some(Self::Verification),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

/// Result of a single edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The working copy was replaced.
    Applied,
    /// The value failed validation; the working copy is unchanged.
    Rejected(String),
    /// Not in edit mode, or the index is out of range.
    Ignored,
}

/// Result of [`StepEditor::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NotEditing,
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Order two steps for persistence: timed steps ascending by offset,
/// untimed steps after every timed one.
pub fn compare_for_save(a: &Step, b: &Step) -> Ordering {
    match (a.time_str(), b.time_str()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ta), Some(tb)) => parse_time_to_seconds(ta).cmp(&parse_time_to_seconds(tb)),
    }
}

/// Stable sort of `steps` with [`compare_for_save`].
pub fn sort_steps_for_save(steps: &[Step]) -> Vec<Step> {
    let mut sorted = steps.to_vec();
    sorted.sort_by(compare_for_save);
    sorted
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Working-copy editor for one manual.
#[derive(Debug, Clone, Default)]
pub struct StepEditor {
    content: Option<ManualContent>,
    working: Option<ManualContent>,
    /// Known video duration in seconds; `0` means unknown.
    video_duration: f64,
}

impl StepEditor {
    /// Create an editor over the persisted content of a manual.
    pub fn new(content: Option<ManualContent>) -> Self {
        Self {
            content,
            working: None,
            video_duration: 0.0,
        }
    }

    /// Record the duration reported by the video element.
    pub fn set_video_duration(&mut self, seconds: f64) {
        self.video_duration = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        };
    }

    pub fn video_duration(&self) -> f64 {
        self.video_duration
    }

    /// The persisted content.
    pub fn content(&self) -> Option<&ManualContent> {
        self.content.as_ref()
    }

    /// Replace the persisted content (e.g. after a refetch). Any edit in
    /// progress is kept.
    pub fn set_content(&mut self, content: Option<ManualContent>) {
        self.content = content;
    }

    /// The working copy while editing.
    pub fn working(&self) -> Option<&ManualContent> {
        self.working.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.working.is_some()
    }

    /// Steps to display: the working copy while editing, otherwise the
    /// persisted steps.
    pub fn visible_steps(&self) -> &[Step] {
        self.working
            .as_ref()
            .or(self.content.as_ref())
            .map(|c| c.steps.as_slice())
            .unwrap_or(&[])
    }

    /// Enter edit mode. Returns `false` when there is no content to edit.
    pub fn begin_edit(&mut self) -> bool {
        match &self.content {
            Some(content) => {
                self.working = Some(content.clone());
                true
            }
            None => false,
        }
    }

    /// Leave edit mode, discarding the working copy.
    pub fn cancel_edit(&mut self) {
        self.working = None;
    }

    /// Append an empty step.
    pub fn add_step(&mut self) -> EditOutcome {
        let Some(working) = &mut self.working else {
            return EditOutcome::Ignored;
        };
        let mut steps = working.steps.clone();
        steps.push(Step::blank());
        working.steps = steps;
        EditOutcome::Applied
    }

    /// Remove the step at `index`.
    pub fn delete_step(&mut self, index: usize) -> EditOutcome {
        let Some(working) = &mut self.working else {
            return EditOutcome::Ignored;
        };
        if index >= working.steps.len() {
            return EditOutcome::Ignored;
        }
        working.steps = working
            .steps
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, s)| s.clone())
            .collect();
        EditOutcome::Applied
    }

    /// Replace one field of the step at `index`.
    ///
    /// A non-empty time is validated before anything changes: values that
    /// parse below zero or beyond the known video duration are rejected,
    /// not clamped. An empty time clears the timestamp.
    pub fn edit_field(&mut self, index: usize, field: StepField, value: &str) -> EditOutcome {
        let in_range = self
            .working
            .as_ref()
            .is_some_and(|w| index < w.steps.len());
        if !in_range {
            return EditOutcome::Ignored;
        }

        if field == StepField::Time && !value.is_empty() {
            if let Err(reason) = self.validate_time(value) {
                return EditOutcome::Rejected(reason);
            }
        }

        let Some(working) = &mut self.working else {
            return EditOutcome::Ignored;
        };
        let Some(current) = working.steps.get(index) else {
            return EditOutcome::Ignored;
        };

        let mut step = current.clone();
        let value = value.to_string();
        match field {
            StepField::Title => step.title = value,
            StepField::Action => step.action = value,
            StepField::Screen => step.screen = value,
            StepField::Notes => step.notes = value,
            StepField::Verification => step.verification = value,
            StepField::Time => step.time = Some(value),
        }

        let mut steps = working.steps.clone();
        steps[index] = step;
        working.steps = steps;
        EditOutcome::Applied
    }

    /// Working steps in persistence order.
    pub fn sorted_steps(&self) -> Option<Vec<Step>> {
        self.working.as_ref().map(|w| sort_steps_for_save(&w.steps))
    }

    /// Sort the working copy and hand it to `store`.
    ///
    /// On success the sorted copy becomes the persisted content and edit
    /// mode ends. On failure the working copy is kept untouched for a retry
    /// and the store's error is returned.
    pub async fn save<S>(&mut self, store: &S, header: &ManualHeader) -> Result<SaveOutcome, S::Error>
    where
        S: ContentStore + ?Sized,
    {
        let Some(working) = &self.working else {
            return Ok(SaveOutcome::NotEditing);
        };

        let sorted = ManualContent {
            steps: sort_steps_for_save(&working.steps),
            ..working.clone()
        };

        store.put_content(header, &sorted).await?;

        self.content = Some(sorted);
        self.working = None;
        Ok(SaveOutcome::Saved)
    }

    fn validate_time(&self, value: &str) -> Result<(), String> {
        let seconds = parse_time_to_seconds(value);
        if seconds < 0 {
            return Err(format!("Time '{value}' is before the start of the video"));
        }
        if self.video_duration > 0.0 && seconds as f64 > self.video_duration {
            return Err(format!(
                "Time '{value}' exceeds the video duration of {:.0}s",
                self.video_duration
            ));
        }
        Ok(())
    }
}
