//! GTFS entities as held by the store.
//!
//! Each type corresponds to one row of a GTFS table after its fields have
//! been validated. Times stay as the feed wrote them and are parsed on
//! demand, so a single malformed time only affects the trips that need it.

use chrono::Weekday;
use serde::Serialize;

use super::{RouteId, ServiceDate, ServiceId, ServiceTime, ShapeId, StopId, TimeError, TripId};

/// Route background colour used when the feed leaves it blank.
pub const DEFAULT_ROUTE_COLOR: &str = "000000";

/// Route text colour used when the feed leaves it blank.
pub const DEFAULT_ROUTE_TEXT_COLOR: &str = "FFFFFF";

/// A transit agency (`agency.txt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agency {
    /// May be empty for single-agency feeds
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
}

/// A stop or station (`stops.txt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// A route (`routes.txt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub agency_id: String,
    pub short_name: String,
    pub long_name: String,
    /// Hex colour without the leading '#'
    pub color: Option<String>,
    /// Hex colour without the leading '#'
    pub text_color: Option<String>,
}

impl Route {
    /// Returns the display colour, falling back to black.
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_ROUTE_COLOR)
    }

    /// Returns the text colour, falling back to white.
    pub fn text_color_or_default(&self) -> &str {
        self.text_color.as_deref().unwrap_or(DEFAULT_ROUTE_TEXT_COLOR)
    }

    /// Returns the short name, or the long name for feeds that only set that.
    pub fn display_name(&self) -> &str {
        if self.short_name.is_empty() {
            &self.long_name
        } else {
            &self.short_name
        }
    }
}

/// A trip (`trips.txt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    pub headsign: Option<String>,
    pub shape_id: Option<ShapeId>,
}

/// A scheduled visit of a trip to a stop (`stop_times.txt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTime {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub sequence: u32,
    /// Raw "HH:MM:SS" as written by the feed
    pub arrival_time: String,
    /// Raw "HH:MM:SS" as written by the feed
    pub departure_time: String,
}

impl StopTime {
    /// Parsed arrival time.
    pub fn arrival(&self) -> Result<ServiceTime, TimeError> {
        ServiceTime::parse(&self.arrival_time)
    }

    /// Parsed departure time.
    pub fn departure(&self) -> Result<ServiceTime, TimeError> {
        ServiceTime::parse(&self.departure_time)
    }
}

/// A weekly service pattern (`calendar.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub service_id: ServiceId,
    /// Active flags, Monday first
    pub days: [bool; 7],
    /// Inclusive, as YYYYMMDD
    pub start_date: u32,
    /// Inclusive, as YYYYMMDD
    pub end_date: u32,
}

impl CalendarEntry {
    /// Returns true if the weekly pattern includes this weekday.
    pub fn runs_on(&self, weekday: Weekday) -> bool {
        self.days[weekday.num_days_from_monday() as usize]
    }

    /// Returns true if the YYYYMMDD date lies within the entry's range.
    pub fn covers(&self, yyyymmdd: u32) -> bool {
        self.start_date <= yyyymmdd && yyyymmdd <= self.end_date
    }

    /// Returns true if the weekly pattern alone makes the service run on `date`.
    pub fn is_active_on(&self, date: ServiceDate) -> bool {
        self.runs_on(date.weekday()) && self.covers(date.as_yyyymmdd())
    }
}

/// Whether a calendar exception adds or removes service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionType {
    /// `exception_type = 1`
    Added,
    /// `exception_type = 2`
    Removed,
}

impl ExceptionType {
    /// Parse the GTFS numeric code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(ExceptionType::Added),
            "2" => Some(ExceptionType::Removed),
            _ => None,
        }
    }
}

/// A single-date override of the weekly pattern (`calendar_dates.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarException {
    pub service_id: ServiceId,
    /// As YYYYMMDD
    pub date: u32,
    pub kind: ExceptionType,
}

/// One vertex of a trip's path geometry (`shapes.txt`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapePoint {
    pub shape_id: ShapeId,
    pub sequence: u32,
    pub lat: f64,
    pub lon: f64,
}
