//! Service dates.
//!
//! GTFS writes dates as "YYYYMMDD" and compares them numerically, so calendar
//! ranges are checked on the integer form rather than with calendar-aware
//! arithmetic.

use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

/// Error returned when parsing an invalid date string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date {input:?}: expected YYYY-MM-DD or YYYYMMDD")]
pub struct InvalidDate {
    input: String,
}

/// Which categorical fallback service a weekday falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayClass {
    /// Monday to Friday
    Workday,
    Saturday,
    Sunday,
}

impl DayClass {
    /// Classify a weekday.
    pub fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat => DayClass::Saturday,
            Weekday::Sun => DayClass::Sunday,
            _ => DayClass::Workday,
        }
    }
}

/// A calendar date on which a service may operate.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ServiceDate;
/// use chrono::Weekday;
///
/// let date = ServiceDate::parse("2024-01-08").unwrap();
/// assert_eq!(date.as_yyyymmdd(), 20240108);
/// assert_eq!(date.weekday(), Weekday::Mon);
///
/// assert_eq!(ServiceDate::parse("20240108").unwrap(), date);
/// assert!(ServiceDate::parse("2024-13-01").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceDate(NaiveDate);

impl ServiceDate {
    /// Wrap a chrono date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse "YYYY-MM-DD" (form input) or "YYYYMMDD" (GTFS).
    pub fn parse(text: &str) -> Result<Self, InvalidDate> {
        let text = text.trim();
        let parsed = match parse_gtfs_date(text) {
            Some(n) => NaiveDate::from_ymd_opt((n / 10_000) as i32, n / 100 % 100, n % 100),
            None => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        };
        parsed.map(Self).ok_or_else(|| InvalidDate {
            input: text.to_string(),
        })
    }

    /// Returns the underlying chrono date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the day of the week.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Returns the weekday class used for fallback services.
    pub fn day_class(&self) -> DayClass {
        DayClass::of(self.weekday())
    }

    /// Returns the date as the GTFS integer YYYYMMDD.
    pub fn as_yyyymmdd(&self) -> u32 {
        // Years outside 0..=9999 do not occur in GTFS feeds
        let year = self.0.year().clamp(0, 9999) as u32;
        year * 10_000 + self.0.month() * 100 + self.0.day()
    }
}

impl From<NaiveDate> for ServiceDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Debug for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceDate({})", self.0)
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a GTFS "YYYYMMDD" field into its integer form.
///
/// Only checks that the field is eight digits; the value is compared
/// numerically and never turned back into a calendar date.
pub fn parse_gtfs_date(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
