/// Duration presentation
use super::tags::{StandardKey, TagMap, TagMapExt};

/// Format a length in seconds as `M:SS`, or `H:MM:SS` once it reaches an hour
///
/// The value is rounded to the nearest whole second first. Negative and
/// non-finite inputs format as `0:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Store a formatted duration under [`StandardKey::Duration`]
pub fn set_duration(tags: &mut TagMap, seconds: f64) {
    tags.set_standard(StandardKey::Duration, format_duration(seconds));
}
