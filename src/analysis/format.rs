//! Human-readable strings for predictions.

/// Render a projected time-to-failure given in hours.
///
/// Under an hour it is shown in whole minutes, under a day in hours with one
/// decimal, otherwise in days with one decimal.
pub fn format_duration(hours: f64) -> String {
    if hours < 1.0 {
        let minutes = (hours * 60.0).round() as i64;
        format!("{} minutes", minutes)
    } else if hours < 24.0 {
        format!("{:.1} hours", hours)
    } else {
        format!("{:.1} days", hours / 24.0)
    }
}

/// Signed rate of change, e.g. `+12.0%/h`.
pub fn format_rate(rate_per_hour: f64, unit: &str) -> String {
    format!("{:+.1}{}/h", rate_per_hour, unit)
}

/// Absolute reading, e.g. `90.0%`.
pub fn format_level(value: f64, unit: &str) -> String {
    format!("{:.1}{}", value, unit)
}
