//! Duration parsing and formatting for limit fields

use std::time::Duration;

/// Parse an `H:MM` duration string into a Duration.
/// Hours are unbounded, minutes must be 0-59.
pub fn parse_hmm(s: &str) -> Result<Duration, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected H:MM format".into());
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| "Invalid hours".to_string())?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| "Invalid minutes".to_string())?;

    if parts[1].len() != 2 {
        return Err("Minutes must be two digits".into());
    }
    if minutes >= 60 {
        return Err("Minutes must be 0-59".into());
    }

    let secs = hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60))
        .ok_or_else(|| "Duration too large".to_string())?;

    Ok(Duration::from_secs(secs))
}

/// Whole minutes in a duration, rounded down
pub fn as_minutes(d: Duration) -> u64 {
    d.as_secs() / 60
}

/// Format a duration as `H:MM`
pub fn format_hmm(d: Duration) -> String {
    let mins = as_minutes(d);
    format!("{}:{:02}", mins / 60, mins % 60)
}

/// Format a duration as `HH:MM:SS`, for usage reports
pub fn format_hms(d: Duration) -> String {
    let total_secs = d.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}
