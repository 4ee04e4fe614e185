//! Wall-clock time, day sets, and the evaluation clock
//!
//! # Mock Time for Development
//!
//! In debug builds, the `FAMLINK_MOCK_TIME` environment variable can be
//! set to override the system time for rule evaluation. This is useful
//! for checking what a config would do on a different day or at a
//! different hour without waiting.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2026-01-07 14:30:00`)

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FAMLINK_MOCK_TIME";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                            let offset = mock_dt.signed_duration_since(chrono::Local::now());
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset.num_seconds(),
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Get the current local time, respecting mock time settings in debug
/// builds. In release builds this always returns the real system time.
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// A time of day with minute precision, used for rule windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
}

impl WallClock {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    /// Returns minutes since midnight
    pub fn as_minutes_from_midnight(&self) -> u32 {
        (self.hour as u32) * 60 + (self.minute as u32)
    }
}

impl PartialOrd for WallClock {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WallClock {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_minutes_from_midnight()
            .cmp(&other.as_minutes_from_midnight())
    }
}

impl std::fmt::Display for WallClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Days of the week mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub const MONDAY: u8 = 1 << 0;
    pub const TUESDAY: u8 = 1 << 1;
    pub const WEDNESDAY: u8 = 1 << 2;
    pub const THURSDAY: u8 = 1 << 3;
    pub const FRIDAY: u8 = 1 << 4;
    pub const SATURDAY: u8 = 1 << 5;
    pub const SUNDAY: u8 = 1 << 6;

    pub const WEEKDAYS: DaysOfWeek = DaysOfWeek(
        Self::MONDAY | Self::TUESDAY | Self::WEDNESDAY | Self::THURSDAY | Self::FRIDAY,
    );
    pub const WEEKENDS: DaysOfWeek = DaysOfWeek(Self::SATURDAY | Self::SUNDAY);
    pub const ALL_DAYS: DaysOfWeek = DaysOfWeek(0x7F);
    pub const NONE: DaysOfWeek = DaysOfWeek(0);

    pub fn new(mask: u8) -> Self {
        Self(mask & 0x7F)
    }

    pub fn single(weekday: Weekday) -> Self {
        Self(1 << weekday.num_days_from_monday())
    }

    /// Inclusive calendar range Mon→Sun. Returns None when the range
    /// would wrap past Sunday (a config format error).
    pub fn range(start: Weekday, end: Weekday) -> Option<Self> {
        let start_idx = start.num_days_from_monday();
        let end_idx = end.num_days_from_monday();
        if start_idx > end_idx {
            return None;
        }
        let mut mask = 0u8;
        for idx in start_idx..=end_idx {
            mask |= 1 << idx;
        }
        Some(Self(mask))
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        (self.0 & (1 << weekday.num_days_from_monday())) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True if any weekday is in both sets
    pub fn intersects(&self, other: DaysOfWeek) -> bool {
        (self.0 & other.0) != 0
    }

    /// Weekdays in this set, Monday first
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        const WEEK: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        WEEK.into_iter().filter(|day| self.contains(*day))
    }
}

impl std::fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::ALL_DAYS {
            return write!(f, "every day");
        }
        let names: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

impl std::ops::BitOr for DaysOfWeek {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// A same-day time window, start inclusive and end exclusive.
/// Wrap-around windows (end before start) are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: WallClock,
    end: WallClock,
}

impl TimeWindow {
    pub fn new(start: WallClock, end: WallClock) -> Option<Self> {
        if end >= start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> WallClock {
        self.start
    }

    pub fn end(&self) -> WallClock {
        self.end
    }

    /// Check if the given time of day falls within this window
    pub fn contains(&self, time: NaiveTime) -> bool {
        let t = WallClock::from_naive_time(time);
        t >= self.start && t < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
