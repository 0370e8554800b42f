// Document key derivation: deterministic from window bounds, sanitized, never empty.

use chrono::{DateTime, Utc};

use crate::models::TimeWindow;

/// Prefix for keys of ad-hoc runs over arbitrary windows. Such snapshots never set the
/// last-processed marker.
pub const CUSTOM_KEY_PREFIX: &str = "custom_";

/// Upper bound on key length; longer candidates fall back to the timestamp key.
pub const MAX_KEY_LEN: usize = 1500;

/// `<start %Y%m%d_%H%M>_<end %H%M>` in UTC.
pub fn window_key(window: &TimeWindow) -> String {
    format!(
        "{}_{}",
        window.start.format("%Y%m%d_%H%M"),
        window.end.format("%H%M")
    )
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize(candidate: &str) -> String {
    candidate
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn fallback_key(at: DateTime<Utc>) -> String {
    format!("metrics_{}", at.timestamp())
}

/// Sanitized `candidate`, or the timestamp key when it is blank or too long.
pub fn resolve_key(candidate: &str, at: DateTime<Utc>) -> String {
    if candidate.trim().is_empty() {
        return fallback_key(at);
    }
    let key = sanitize(candidate);
    if key.len() > MAX_KEY_LEN {
        return fallback_key(at);
    }
    key
}
