//! Unit conversions for status fields.

/// Render a duration in seconds as `H:MM:SS`.
///
/// Hours are not zero-padded and are not wrapped into days. Fractional
/// seconds are truncated. Negative or non-finite input has no rendering.
pub fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let total = seconds.trunc() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    Some(format!("{}:{:02}:{:02}", hours, minutes, secs))
}

/// Convert a 0-1 fraction into a percentage rounded to one decimal.
pub fn progress_percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0).as_deref(), Some("0:00:00"));
        assert_eq!(format_duration(300.0).as_deref(), Some("0:05:00"));
        assert_eq!(format_duration(600.0).as_deref(), Some("0:10:00"));
        assert_eq!(format_duration(3661.0).as_deref(), Some("1:01:01"));
        assert_eq!(format_duration(90061.9).as_deref(), Some("25:01:01"));
    }

    #[test]
    fn test_format_duration_rejects_garbage() {
        assert_eq!(format_duration(-1.0), None);
        assert_eq!(format_duration(f64::NAN), None);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0.5), 50.0);
        assert_eq!(progress_percent(0.75), 75.0);
        assert_eq!(progress_percent(0.1234), 12.3);
        assert_eq!(progress_percent(0.0), 0.0);
        assert_eq!(progress_percent(1.0), 100.0);
    }
}
