//! Display helpers for conversion results.

/// Format a byte count with binary units, e.g. `1.5 KB`.
///
/// Values are rounded to at most two decimals and trailing zeros are
/// dropped.
///
/// # Example
///
/// ```
/// use audiolift::utilities::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(16044), "15.67 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Format a duration in seconds as `m:ss`.
///
/// Fractional seconds are truncated; negative or non-finite input is shown
/// as `0:00`.
///
/// # Example
///
/// ```
/// use audiolift::utilities::format_time;
///
/// assert_eq!(format_time(75.9), "1:15");
/// assert_eq!(format_time(3600.0), "60:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
