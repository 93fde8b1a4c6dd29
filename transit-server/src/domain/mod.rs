//! Domain types for the transit trip planner.
//!
//! This module contains the core domain model types that represent
//! validated GTFS data and the itineraries built from it. Types enforce
//! their invariants at construction time, so code that receives them can
//! trust their validity.

mod date;
mod entities;
mod error;
mod ids;
mod itinerary;
mod time;

pub use date::{DayClass, InvalidDate, ServiceDate, parse_gtfs_date};
pub use entities::{
    Agency, CalendarEntry, CalendarException, DEFAULT_ROUTE_COLOR, DEFAULT_ROUTE_TEXT_COLOR,
    ExceptionType, Route, ShapePoint, Stop, StopTime, Trip,
};
pub use error::DomainError;
pub use ids::{RouteId, ServiceId, ShapeId, StopId, TripId};
pub use itinerary::{Itinerary, ItineraryKind, Segment, Transfer};
pub use time::{
    ServiceTime, TimeError, format_duration, format_minutes_to_time, parse_time_to_minutes,
};
