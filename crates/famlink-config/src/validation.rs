//! Rule field validation and ambiguity detection

use crate::schema::RawRule;
use chrono::Weekday;
use famlink_util::{parse_hmm, DaysOfWeek, TimeWindow, WallClock};
use std::time::Duration;
use thiserror::Error;

/// Validation error, carrying the offending row's line number
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Line {line}: {message}")]
    RowError { line: usize, message: String },

    #[error("Line {line}: invalid duration '{value}': {message}")]
    InvalidDuration {
        line: usize,
        value: String,
        message: String,
    },

    #[error("Line {line}: invalid day specification '{value}': {message}")]
    InvalidDaySpec {
        line: usize,
        value: String,
        message: String,
    },

    #[error("Line {line}: invalid time range '{value}': {message}")]
    InvalidTimeRange {
        line: usize,
        value: String,
        message: String,
    },

    #[error(
        "Ambiguous rules for '{app}': lines {first_line} and {second_line} both match {weekday}"
    )]
    AmbiguousRules {
        app: String,
        weekday: Weekday,
        first_line: usize,
        second_line: usize,
    },
}

/// The parsed fields of one row, before the table-level ambiguity pass
#[derive(Debug, Clone)]
pub struct ParsedRule {
    pub line: usize,
    pub app: String,
    pub limit: Option<Duration>,
    pub days: DaysOfWeek,
    pub window: Option<TimeWindow>,
}

/// Parse and validate a single raw row, collecting every field error
pub fn parse_rule(raw: &RawRule) -> Result<ParsedRule, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if raw.app.is_empty() {
        errors.push(ValidationError::RowError {
            line: raw.line,
            message: "app name cannot be empty".into(),
        });
    }

    let limit = if raw.max_duration.is_empty() {
        None
    } else {
        match parse_hmm(&raw.max_duration) {
            Ok(d) => Some(d),
            Err(message) => {
                errors.push(ValidationError::InvalidDuration {
                    line: raw.line,
                    value: raw.max_duration.clone(),
                    message,
                });
                None
            }
        }
    };

    let days = match parse_days(&raw.days) {
        Ok(days) => days,
        Err(message) => {
            errors.push(ValidationError::InvalidDaySpec {
                line: raw.line,
                value: raw.days.clone(),
                message,
            });
            DaysOfWeek::NONE
        }
    };

    let window = if raw.time_range.is_empty() {
        None
    } else {
        match parse_time_range(&raw.time_range) {
            Ok(w) => Some(w),
            Err(message) => {
                errors.push(ValidationError::InvalidTimeRange {
                    line: raw.line,
                    value: raw.time_range.clone(),
                    message,
                });
                None
            }
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ParsedRule {
        line: raw.line,
        app: raw.app.clone(),
        limit,
        days,
        window,
    })
}

/// Detect rules for the same app whose day sets overlap.
/// At most one rule may match a given (app, weekday) pair.
pub fn check_ambiguity(rules: &[ParsedRule]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, a) in rules.iter().enumerate() {
        for b in &rules[i + 1..] {
            if !a.app.eq_ignore_ascii_case(&b.app) {
                continue;
            }
            if !a.days.intersects(b.days) {
                continue;
            }
            // Name the first overlapping weekday in the error
            let weekday = [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ]
            .into_iter()
            .find(|d| a.days.contains(*d) && b.days.contains(*d))
            .unwrap_or(Weekday::Mon);

            errors.push(ValidationError::AmbiguousRules {
                app: a.app.clone(),
                weekday,
                first_line: a.line,
                second_line: b.line,
            });
        }
    }

    errors
}

/// Parse a days field: empty (every day), one weekday, or an inclusive
/// `Start-End` range in calendar order Mon→Sun
pub fn parse_days(s: &str) -> Result<DaysOfWeek, String> {
    if s.is_empty() {
        return Ok(DaysOfWeek::ALL_DAYS);
    }

    if let Some((start, end)) = s.split_once('-') {
        let start = parse_weekday(start.trim())?;
        let end = parse_weekday(end.trim())?;
        return DaysOfWeek::range(start, end)
            .ok_or_else(|| "range must follow calendar order Mon-Sun without wrapping".to_string());
    }

    Ok(DaysOfWeek::single(parse_weekday(s)?))
}

/// Parse a weekday name, short or full, case insensitive
pub fn parse_weekday(s: &str) -> Result<Weekday, String> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        other => Err(format!("unknown weekday: {}", other)),
    }
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<WallClock, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("expected HH:MM format".into());
    }

    let hour: u8 = parts[0].parse().map_err(|_| "invalid hour".to_string())?;
    let minute: u8 = parts[1]
        .parse()
        .map_err(|_| "invalid minute".to_string())?;

    WallClock::new(hour, minute).ok_or_else(|| "hour must be 0-23, minute 0-59".to_string())
}

/// Parse a `HH:MM-HH:MM` time range, start inclusive and end exclusive.
/// The end must not be before the start (no wrap-around windows).
pub fn parse_time_range(s: &str) -> Result<TimeWindow, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| "expected HH:MM-HH:MM format".to_string())?;
    let start = parse_time(start.trim())?;
    let end = parse_time(end.trim())?;
    TimeWindow::new(start, end).ok_or_else(|| "end must not be before start".to_string())
}
