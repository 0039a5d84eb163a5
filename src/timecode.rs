//! `HH:MM:SS` labels for a seek bar.

const ZERO: &str = "00:00:00";

/// Formats `seconds` as `HH:MM:SS`, truncating fractions. Negative and
/// non-finite values format as zero.
#[must_use]
pub fn format_hms(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return ZERO.to_owned();
    }
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = total / 60 - hours * 60;
    let secs = total - (hours * 3600 + minutes * 60);
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Returns the elapsed and remaining labels for `position` within
/// `duration`, both in seconds.
#[must_use]
pub fn seek_labels(position: f64, duration: f64) -> (String, String) {
    if duration == 0.0 {
        return (ZERO.to_owned(), ZERO.to_owned());
    }
    let seek = position / duration;
    (
        format_hms(duration * seek),
        format_hms(duration * (1.0 - seek)),
    )
}
