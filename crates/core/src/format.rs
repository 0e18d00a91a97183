use chrono::Duration;

/// Compact rendering of an elapsed time: whole hours (days folded into
/// hours) and remaining minutes, e.g. `"26h 5m"`. Zero components are
/// omitted and a zero duration renders as the empty string. Seconds are
/// truncated, so rounding happens only at the minute boundary.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, 0) => String::new(),
        (h, 0) => format!("{h}h"),
        (0, m) => format!("{m}m"),
        (h, m) => format!("{h}h {m}m"),
    }
}
