//! Conversion between `M:SS` step timestamps and whole seconds.
//!
//! Two parsers exist because the editor and the playback views accept
//! different shapes: the editor only understands `M:SS`, while playback
//! also understands `H:MM:SS`. Both are total: malformed input, including
//! parts too large to represent in seconds, yields `0`.

/// Parse an editor timestamp (`"0:15"`, `"12:05"`) into seconds.
///
/// Exactly two colon-separated parts are accepted. Each part is read with
/// leading-integer semantics (`"5x"` reads as `5`, `"x"` as `0`), so the
/// result may be negative when a part carries a minus sign. Empty or
/// otherwise malformed input returns `0`.
pub fn parse_time_to_seconds(time: &str) -> i64 {
    if time.trim().is_empty() {
        return 0;
    }

    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2 {
        return 0;
    }

    let minutes = leading_int(parts[0]).unwrap_or(0);
    let seconds = leading_int(parts[1]).unwrap_or(0);
    combine(&[minutes, seconds]).unwrap_or(0)
}

/// Parse a playback timestamp into seconds.
///
/// Accepts `M:SS` and `H:MM:SS`. Every part must be a plain number
/// (surrounding whitespace allowed, empty parts count as zero); anything
/// else makes the whole value `0`.
pub fn parse_playback_time(time: &str) -> i64 {
    let parts: Option<Vec<i64>> = time.split(':').map(strict_int).collect();

    match parts.as_deref() {
        Some(parts @ ([_, _] | [_, _, _])) => combine(parts).unwrap_or(0),
        _ => 0,
    }
}

/// Fold base-60 parts (most significant first) into seconds. `None` on
/// overflow.
fn combine(parts: &[i64]) -> Option<i64> {
    parts
        .iter()
        .try_fold(0i64, |acc, &part| acc.checked_mul(60)?.checked_add(part))
}

/// Format seconds as `M:SS`.
///
/// Fractions are truncated and only the seconds field is zero-padded.
/// Negative and non-finite input formats as `0:00`.
pub fn format_seconds_to_time(total_seconds: f64) -> String {
    let whole = if total_seconds.is_finite() && total_seconds > 0.0 {
        total_seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Read the leading (optionally signed) integer of `s`, ignoring leading
/// whitespace and any trailing garbage. `None` when there are no digits.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a whole part as an integer. Blank parts count as zero.
fn strict_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    s.parse().ok()
}
