//! The signed-in session.
//!
//! [`Session`] is the only place the bearer token lives. The API client
//! reads it on every request and clears it on `401`; views read it to
//! decide whether to show the login screen. Share it as `Arc<Session>`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// On-disk representation of a persisted session.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Errors from session persistence.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Holder of the current auth token, optionally persisted to a file.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl Session {
    /// A session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A session persisted to `path`. Call [`init`](Self::init) to load a
    /// previously stored token.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            token: RwLock::new(None),
            path: Some(path.into()),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the stored token. A missing file means signed out; an
    /// unreadable one is discarded with a warning.
    pub async fn init(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<StoredSession>(&raw) {
            Ok(stored) => {
                *self.token.write().await = Some(stored.token);
                tracing::debug!(path = %path.display(), "Restored session");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable session file");
            }
        }
        Ok(())
    }

    /// Current token, if signed in.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Store a new token, persisting it when file-backed.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if let Some(path) = &self.path {
            let encoded = serde_json::to_vec(&StoredSession {
                token: token.clone(),
            })?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, encoded).await?;
        }
        *self.token.write().await = Some(token);
        Ok(())
    }

    /// Forget the token and remove the backing file.
    pub async fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().await = None;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
