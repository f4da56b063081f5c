//! Playback synchronizer: keeps the highlighted step in line with the
//! video position.
//!
//! The synchronizer is a plain state machine fed with media events by the
//! embedding view. It never touches the player itself; seeking is returned
//! as a [`SeekCommand`] for the caller to apply.

use std::sync::LazyLock;

use regex::Regex;

use crate::manual::Step;
use crate::step_locator::locate_current_step;
use crate::time_codec::{parse_playback_time, parse_time_to_seconds};

/// Leading "ステップN:" label that generated titles carry.
static STEP_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ステップ\d+:\s*").expect("valid regex"));

/// Denominator used for timeline positions when the duration is unknown.
const FALLBACK_TIMELINE_SECS: f64 = 100.0;

/// Player state as observed through media events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Native media events forwarded by the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
    /// Current position in seconds.
    TimeUpdate(f64),
}

/// Emitted when the highlighted step changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Instruction for the player after a step's time label is clicked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCommand {
    pub position_secs: f64,
    /// Start playback because the player was not playing.
    pub resume: bool,
}

/// Per-video synchronizer.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSynchronizer {
    steps: Vec<Step>,
    state: PlaybackState,
    position: f64,
    highlighted: Option<usize>,
    suspended: bool,
}

impl PlaybackSynchronizer {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// The highlighted step, if any.
    pub fn current_step(&self) -> Option<&Step> {
        self.highlighted.and_then(|i| self.steps.get(i))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Replace the step list and re-evaluate at the last known position.
    pub fn set_steps(&mut self, steps: Vec<Step>) -> Option<HighlightChange> {
        self.steps = steps;
        self.refresh()
    }

    /// Suspend or resume highlighting. While suspended (edit mode) time
    /// updates are tracked but the locator does not run and the highlight
    /// is cleared.
    pub fn set_suspended(&mut self, suspended: bool) -> Option<HighlightChange> {
        self.suspended = suspended;
        self.refresh()
    }

    /// Apply a media event.
    pub fn handle(&mut self, event: MediaEvent) -> Option<HighlightChange> {
        match event {
            MediaEvent::Play => {
                self.state = PlaybackState::Playing;
                None
            }
            MediaEvent::Pause | MediaEvent::Ended => {
                self.state = PlaybackState::Paused;
                None
            }
            MediaEvent::TimeUpdate(position) => {
                self.position = position;
                self.refresh()
            }
        }
    }

    /// Seek to the step at `index`. Untimed or unknown steps yield `None`.
    pub fn seek_to_step(&mut self, index: usize) -> Option<SeekCommand> {
        let secs = self.steps.get(index)?.time_str().map(parse_playback_time)?;
        Some(self.seek(secs as f64))
    }

    /// Seek to an editor time label (`M:SS`). Empty labels yield `None`.
    pub fn seek_to_time(&mut self, time: &str) -> Option<SeekCommand> {
        if time.is_empty() {
            return None;
        }
        Some(self.seek(parse_time_to_seconds(time).max(0) as f64))
    }

    /// Play when paused or idle, pause when playing. Returns the new state.
    pub fn toggle_play_pause(&mut self) -> PlaybackState {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Idle | PlaybackState::Paused => PlaybackState::Playing,
        };
        self.state
    }

    fn seek(&mut self, position: f64) -> SeekCommand {
        let resume = self.state != PlaybackState::Playing;
        self.state = PlaybackState::Playing;
        SeekCommand {
            position_secs: position,
            resume,
        }
    }

    fn refresh(&mut self) -> Option<HighlightChange> {
        let next = if self.suspended {
            None
        } else {
            locate_current_step(&self.steps, self.position)
        };
        if next == self.highlighted {
            return None;
        }
        let change = HighlightChange {
            previous: self.highlighted,
            current: next,
        };
        self.highlighted = next;
        Some(change)
    }
}

/// Step title without the generated "ステップN:" prefix.
pub fn display_title(step: &Step) -> String {
    STEP_LABEL_RE.replace(&step.title, "").into_owned()
}

/// Position of a step on the editor timeline as a fraction of the video.
///
/// Untimed steps sit at the start. When the duration is unknown the
/// timeline spans 100 seconds. The result is clamped to `0.0..=1.0`.
pub fn timeline_fraction(step: &Step, video_duration: f64) -> f64 {
    let secs = step.time_str().map(parse_time_to_seconds).unwrap_or(0) as f64;
    let span = if video_duration > 0.0 {
        video_duration
    } else {
        FALLBACK_TIMELINE_SECS
    };
    (secs / span).clamp(0.0, 1.0)
}
