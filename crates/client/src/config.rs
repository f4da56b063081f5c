use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost:8000`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash.
    pub api_url: String,
    /// Origin of the web app, used to build public share URLs.
    pub app_origin: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Interval between generation status checks in seconds (default: `3`).
    pub poll_interval_secs: u64,
    /// File the session token is persisted to. In-memory when unset.
    pub session_file: Option<PathBuf>,
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            app_origin: "http://localhost:3000".into(),
            request_timeout_secs: 30,
            poll_interval_secs: 3,
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Read configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `TORISETSU_API_URL`              | `http://localhost:8000` |
    /// | `TORISETSU_APP_ORIGIN`           | `http://localhost:3000` |
    /// | `TORISETSU_REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `TORISETSU_POLL_INTERVAL_SECS`   | `3`                     |
    /// | `TORISETSU_SESSION_FILE`         | unset                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("TORISETSU_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let app_origin = lookup("TORISETSU_APP_ORIGIN")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.app_origin);

        let request_timeout_secs = parse_positive(
            "TORISETSU_REQUEST_TIMEOUT_SECS",
            lookup("TORISETSU_REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout_secs,
        )?;

        let poll_interval_secs = parse_positive(
            "TORISETSU_POLL_INTERVAL_SECS",
            lookup("TORISETSU_POLL_INTERVAL_SECS"),
            defaults.poll_interval_secs,
        )?;

        let session_file = lookup("TORISETSU_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_url,
            app_origin,
            request_timeout_secs,
            poll_interval_secs,
            session_file,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn parse_positive(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "a positive integer",
            value: raw,
        }),
    }
}
