//! TORISETSU client event bus and notice channel.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; background work (status polling) reports
//!   through it instead of mutating view state directly.
//! - [`Notice`] — the single user-facing reporting type, with one policy
//!   for choosing between transient and form-scoped presentation.

pub mod bus;
pub mod notice;

pub use bus::{ClientEvent, EventBus};
pub use notice::{Notice, NoticeKind, NoticeScope};
