//! Advisory validation for video uploads.
//!
//! The backend is the authority on what it accepts; these checks only stop
//! obviously unacceptable files before any bytes leave the client.

use crate::error::CoreError;

/// Maximum accepted video size (100 MiB).
pub const MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;

/// MIME types offered by the upload picker.
pub const ALLOWED_VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/webm", "video/avi", "video/mov"];

/// Aliases browsers report for the allowed container formats.
const MIME_ALIASES: &[&str] = &["video/quicktime", "video/x-msvideo"];

/// Extensions accepted by the server.
pub const ALLOWED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "avi", "mov"];

/// Generic MIME types that carry no format information.
const GENERIC_MIME_TYPES: &[&str] = &["", "application/octet-stream"];

/// Validate a video before upload.
///
/// The MIME type decides when it is specific; when it is empty or generic
/// the file extension is checked instead.
pub fn validate_video_upload(filename: &str, mime_type: &str, size_bytes: u64) -> Result<(), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation("The selected file is empty".into()));
    }
    if size_bytes > MAX_VIDEO_BYTES {
        return Err(CoreError::Validation(format!(
            "File is too large. Maximum size is {}MB",
            MAX_VIDEO_BYTES / 1024 / 1024
        )));
    }

    let mime = mime_type.trim().to_ascii_lowercase();
    let accepted = if GENERIC_MIME_TYPES.contains(&mime.as_str()) {
        has_allowed_extension(filename)
    } else {
        ALLOWED_VIDEO_MIME_TYPES.contains(&mime.as_str()) || MIME_ALIASES.contains(&mime.as_str())
    };

    if !accepted {
        return Err(CoreError::Validation(format!(
            "Unsupported file type. Allowed types: {}",
            ALLOWED_VIDEO_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

/// Whether `filename` ends in one of [`ALLOWED_VIDEO_EXTENSIONS`].
pub fn has_allowed_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Best-effort MIME type for an allowed video extension.
pub fn mime_for_filename(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("avi") => "video/avi",
        Some("mov") => "video/mov",
        _ => "application/octet-stream",
    }
}

/// URL of an uploaded video, served statically by the backend under
/// `/uploads/{basename}`. `None` for an empty path.
pub fn video_url(api_url: &str, file_path: &str) -> Option<String> {
    let name = file_path.rsplit(['/', '\\']).next().filter(|n| !n.is_empty())?;
    Some(format!("{}/uploads/{name}", api_url.trim_end_matches('/')))
}
