//! Service-day time handling for GTFS.
//!
//! GTFS gives stop times as "HH:MM:SS" measured from noon minus twelve hours
//! on the service day. Trips running past midnight keep counting, so "25:10:00"
//! is ten past one the next morning but still belongs to the previous service
//! day. This module keeps those values as plain minutes so they compare
//! correctly without any day-rollover guessing.

use chrono::Duration;
use std::fmt;

/// Error returned when a time string cannot be decomposed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// The text is not `H:MM` / `HH:MM:SS` shaped.
    #[error("invalid time format {input:?}: {reason}")]
    InvalidFormat { input: String, reason: &'static str },
}

impl TimeError {
    fn invalid(input: &str, reason: &'static str) -> Self {
        TimeError::InvalidFormat {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a GTFS time of day into minutes since the start of the service day.
///
/// Seconds are discarded. Hours of 24 and above are accepted as-is.
///
/// # Examples
///
/// ```
/// use transit_server::domain::parse_time_to_minutes;
///
/// assert_eq!(parse_time_to_minutes("08:20:00").unwrap(), 500);
/// assert_eq!(parse_time_to_minutes("7:05").unwrap(), 425);
/// assert_eq!(parse_time_to_minutes("25:10:00").unwrap(), 1510);
///
/// assert!(parse_time_to_minutes("0800").is_err());
/// assert!(parse_time_to_minutes("ab:10").is_err());
/// ```
pub fn parse_time_to_minutes(text: &str) -> Result<u32, TimeError> {
    let (hour, minute) = hour_and_minute(text)?;
    combine(text, hour, minute)
}

fn hour_and_minute(text: &str) -> Result<(u32, u32), TimeError> {
    let mut parts = text.trim().split(':');

    let hour = parts
        .next()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| TimeError::invalid(text, "missing hour"))?;
    let minute = parts
        .next()
        .ok_or_else(|| TimeError::invalid(text, "expected at least hour and minute"))?;

    let hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| TimeError::invalid(text, "hour is not a number"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| TimeError::invalid(text, "minute is not a number"))?;

    Ok((hour, minute))
}

fn combine(text: &str, hour: u32, minute: u32) -> Result<u32, TimeError> {
    hour.checked_mul(60)
        .and_then(|h| h.checked_add(minute))
        .ok_or_else(|| TimeError::invalid(text, "time out of range"))
}

/// Format minutes since the start of the service day as "HH:MM".
///
/// Hours are not wrapped at 24, matching how the feed itself writes
/// post-midnight times.
///
/// ```
/// use transit_server::domain::format_minutes_to_time;
///
/// assert_eq!(format_minutes_to_time(0), "00:00");
/// assert_eq!(format_minutes_to_time(545), "09:05");
/// assert_eq!(format_minutes_to_time(1510), "25:10");
/// ```
pub fn format_minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Format a duration in minutes for display, e.g. "1h 5m" or "40m".
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// A time on a GTFS service day, in whole minutes since its start.
///
/// Values of 1440 and above are later than every same-day value, which is
/// exactly the ordering the feed intends for trips that run past midnight.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Create a time from minutes since the start of the service day.
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Parse a GTFS "HH:MM:SS" (or "HH:MM") string.
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        parse_time_to_minutes(text).map(Self)
    }

    /// Parse a user-entered "HH:MM" time.
    ///
    /// Stricter than [`ServiceTime::parse`]: the minute must be below 60.
    /// Hours of 24 and above are still accepted for after-midnight queries.
    pub fn parse_clock(text: &str) -> Result<Self, TimeError> {
        let (hour, minute) = hour_and_minute(text)?;
        if minute >= 60 {
            return Err(TimeError::invalid(text, "minute must be below 60"));
        }
        combine(text, hour, minute).map(Self)
    }

    /// Returns minutes since the start of the service day.
    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Returns true if this time belongs to the early hours of the next
    /// calendar day (24:00 or later).
    pub fn is_after_midnight(&self) -> bool {
        self.0 >= 24 * 60
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::minutes(i64::from(self.0) - i64::from(other.0))
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({})", format_minutes_to_time(self.0))
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minutes_to_time(self.0))
    }
}
