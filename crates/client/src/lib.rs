//! TORISETSU REST client.
//!
//! Typed access to the TORISETSU backend (projects, torisetsu, manuals,
//! uploads, sharing, the setup wizard), the session that holds the bearer
//! token, and the background polling that watches manual generation.

pub mod api;
pub mod config;
pub mod error;
pub mod polling;
pub mod session;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use polling::{PollConfig, PollHandle};
pub use session::Session;
