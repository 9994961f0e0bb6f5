//! Human-readable renderings used in notification messages.

use crate::constants::BYTES_PER_GB;

/// Render a millisecond duration as `H:MM:SS`.
///
/// Hours are not padded and may exceed 24; fractional seconds are dropped.
///
/// # Examples
/// `125_000` renders as `"0:02:05"`, `90_061_000` as `"25:01:01"`.
pub fn format_duration_ms(duration_ms: u64) -> String {
    let total_seconds: u64 = duration_ms / 1000;
    let hours: u64 = total_seconds / 3600;
    let minutes: u64 = (total_seconds % 3600) / 60;
    let seconds: u64 = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

/// Convert a byte count to decimal gigabytes.
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}
