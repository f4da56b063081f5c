//! Share-link helpers.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Expiry requested when the caller does not choose one.
pub const DEFAULT_SHARE_EXPIRY_DAYS: u32 = 7;

/// Longest expiry the client will request.
pub const MAX_SHARE_EXPIRY_DAYS: u32 = 365;

/// Public playback URL for a share token.
pub fn share_url(origin: &str, token: &str) -> String {
    format!("{}/share/{token}", origin.trim_end_matches('/'))
}

/// Whether a link with the given expiry is no longer valid at `now`.
/// Links without an expiry never expire.
pub fn is_share_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    expires_at.is_some_and(|at| at < now)
}

/// Expiry timestamp for a link created at `now`.
pub fn expiry_from(now: Timestamp, days: u32) -> Timestamp {
    now + Duration::days(i64::from(days))
}

pub fn validate_expiry_days(days: u32) -> Result<(), CoreError> {
    if days == 0 || days > MAX_SHARE_EXPIRY_DAYS {
        return Err(CoreError::Validation(format!(
            "Share expiry must be between 1 and {MAX_SHARE_EXPIRY_DAYS} days, got {days}"
        )));
    }
    Ok(())
}
