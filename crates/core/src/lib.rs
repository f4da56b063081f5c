//! TORISETSU domain logic.
//!
//! Pure, I/O-free building blocks shared by the client crates: the manual
//! data model, the `M:SS` time codec, the step locator and editor, the
//! playback state machine, and the advisory validation rules for uploads,
//! share links and the first-run wizard.

pub mod error;
pub mod manual;
pub mod models;
pub mod playback;
pub mod share;
pub mod step_editor;
pub mod step_locator;
pub mod time_codec;
pub mod types;
pub mod upload;
pub mod wizard;
