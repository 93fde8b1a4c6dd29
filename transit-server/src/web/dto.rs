//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Itinerary, ItineraryKind, Segment, Stop, StopTime, format_duration};
use crate::gtfs::{GtfsStore, SegmentPath};
use crate::planner::{PlanOutcome, QueryMode};

/// Request to search stops by name.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Substring to search for (case-insensitive, at least two characters)
    pub q: String,

    /// Maximum number of results (default 10, at most 50)
    pub limit: Option<usize>,
}

/// A stop in API responses.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    /// Matching stops, in feed order
    pub stops: Vec<StopResult>,
}

/// Whether the requested time is a departure or arrival bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeParam {
    #[default]
    DepartAfter,
    ArriveBy,
}

impl From<ModeParam> for QueryMode {
    fn from(mode: ModeParam) -> Self {
        match mode {
            ModeParam::DepartAfter => QueryMode::DepartAfter,
            ModeParam::ArriveBy => QueryMode::ArriveBy,
        }
    }
}

/// Request to plan a trip.
#[derive(Debug, Deserialize)]
pub struct PlanTripRequest {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// Service date in YYYY-MM-DD format
    pub date: String,

    /// Reference time in HH:MM format
    pub time: String,

    /// Defaults to depart_after
    #[serde(default)]
    pub mode: ModeParam,
}

/// Outcome of a plan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Ok,
    NoService,
    NoItinerary,
}

/// Response for trip planning.
#[derive(Debug, Serialize)]
pub struct PlanTripResponse {
    pub status: PlanStatus,

    /// Explanation when there are no itineraries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Found itineraries, best first
    pub itineraries: Vec<ItineraryResult>,
}

/// Kind of itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KindResult {
    Direct,
    Transfer,
}

/// An itinerary option.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    pub kind: KindResult,

    /// Departure time from origin
    pub departure_time: String,

    /// Arrival time at destination
    pub arrival_time: String,

    /// Total duration in minutes
    pub duration_mins: i64,

    /// Total duration for display, e.g. "1h 5m"
    pub duration_text: String,

    /// The change between segments, for transfer itineraries
    pub transfer: Option<TransferResult>,

    /// Rides in travel order
    pub segments: Vec<SegmentResult>,
}

/// The change between two segments.
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub stop: StopResult,

    /// Wait at the stop in minutes
    pub wait_mins: i64,
}

/// One ride in an itinerary.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    pub route_id: String,

    /// Short name, or the long name if the feed has no short name
    pub route_name: String,

    /// Background colour as hex without '#'
    pub route_color: String,

    /// Text colour as hex without '#'
    pub route_text_color: String,

    pub trip_id: String,

    pub headsign: Option<String>,

    pub departure_time: String,

    pub arrival_time: String,

    pub duration_mins: i64,

    /// Stops from boarding to alighting, inclusive
    pub stops: Vec<CallResult>,

    pub path: PathResult,
}

/// A stop visited during a segment.
#[derive(Debug, Serialize)]
pub struct CallResult {
    pub id: String,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    /// Absent if the feed's time doesn't parse
    pub arrival_time: Option<String>,

    /// Absent if the feed's time doesn't parse
    pub departure_time: Option<String>,
}

/// Drawable geometry of a segment.
#[derive(Debug, Serialize)]
pub struct PathResult {
    /// `[lat, lon]` pairs
    pub points: Vec<[f64; 2]>,

    /// True if the path joins stops because the trip has no shape
    pub approximate: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StopResult {
    /// Create from a domain Stop.
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name.clone(),
            lat: stop.lat,
            lon: stop.lon,
        }
    }
}

impl PlanTripResponse {
    /// Create from a planner outcome.
    pub fn from_outcome(outcome: &PlanOutcome<'_>, store: &GtfsStore) -> Self {
        match outcome {
            PlanOutcome::Itineraries(found) => Self {
                status: PlanStatus::Ok,
                message: None,
                itineraries: found
                    .iter()
                    .map(|it| ItineraryResult::from_itinerary(it, store))
                    .collect(),
            },
            PlanOutcome::NoServiceForDate => Self {
                status: PlanStatus::NoService,
                message: Some("No service available on the selected date".to_string()),
                itineraries: Vec::new(),
            },
            PlanOutcome::NoItineraryFound => Self {
                status: PlanStatus::NoItinerary,
                message: Some("No routes found for the selected criteria".to_string()),
                itineraries: Vec::new(),
            },
        }
    }
}

impl ItineraryResult {
    /// Create from a domain Itinerary.
    pub fn from_itinerary(itinerary: &Itinerary<'_>, store: &GtfsStore) -> Self {
        let kind = match itinerary.kind() {
            ItineraryKind::Direct => KindResult::Direct,
            ItineraryKind::Transfer => KindResult::Transfer,
        };

        let transfer = itinerary.transfer().map(|t| TransferResult {
            stop: StopResult::from_stop(t.stop),
            wait_mins: t.wait.num_minutes(),
        });

        Self {
            kind,
            departure_time: itinerary.departure_time().to_string(),
            arrival_time: itinerary.arrival_time().to_string(),
            duration_mins: itinerary.duration_mins(),
            duration_text: format_duration(itinerary.duration_mins()),
            transfer,
            segments: itinerary
                .segments()
                .iter()
                .map(|s| SegmentResult::from_segment(s, store))
                .collect(),
        }
    }
}

impl SegmentResult {
    /// Create from a domain Segment.
    pub fn from_segment(segment: &Segment<'_>, store: &GtfsStore) -> Self {
        let route = segment.route();
        let trip = segment.trip();

        Self {
            route_id: route.id.to_string(),
            route_name: route.display_name().to_string(),
            route_color: route.color_or_default().to_string(),
            route_text_color: route.text_color_or_default().to_string(),
            trip_id: trip.id.to_string(),
            headsign: trip.headsign.clone(),
            departure_time: segment.departure_time().to_string(),
            arrival_time: segment.arrival_time().to_string(),
            duration_mins: segment.duration().num_minutes(),
            stops: segment
                .stop_times()
                .iter()
                .map(|st| CallResult::from_stop_time(st, store))
                .collect(),
            path: PathResult::from(store.segment_path(segment)),
        }
    }
}

impl CallResult {
    /// Create from a stop time, looking up its stop.
    pub fn from_stop_time(stop_time: &StopTime, store: &GtfsStore) -> Self {
        let stop = store.stop(stop_time.stop_id.as_str());

        Self {
            id: stop_time.stop_id.to_string(),
            name: stop.map(|s| s.name.clone()).unwrap_or_default(),
            lat: stop.map(|s| s.lat),
            lon: stop.map(|s| s.lon),
            arrival_time: stop_time.arrival().ok().map(|t| t.to_string()),
            departure_time: stop_time.departure().ok().map(|t| t.to_string()),
        }
    }
}

impl From<SegmentPath> for PathResult {
    fn from(path: SegmentPath) -> Self {
        Self {
            points: path.points.into_iter().map(|(lat, lon)| [lat, lon]).collect(),
            approximate: path.approximate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ServiceDate, ServiceTime, StopId};
    use crate::gtfs::test_feed::FeedBuilder;
    use crate::planner::{PlanRequest, Planner, PlannerConfig};
    use chrono::NaiveDate;

    fn monday() -> ServiceDate {
        ServiceDate::new(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
    }

    fn store() -> GtfsStore {
        FeedBuilder::new()
            .stops(&["A", "B", "C"])
            .route("R1", "10")
            .route("R2", "20")
            .calendar("S1", "1111111", 20240101, 20241231)
            .shaped_trip(
                "T1",
                "R1",
                "S1",
                "SH1",
                &[("A", "08:00:00", "08:00:00"), ("B", "08:20:00", "08:20:00")],
            )
            .trip(
                "T2",
                "R2",
                "S1",
                &[("B", "08:25:00", "08:25:00"), ("C", "09:30:00", "09:30:00")],
            )
            .shape_point("SH1", 1, 47.0, 18.0)
            .shape_point("SH1", 2, 47.1, 18.1)
            .shape_point("SH1", 3, 47.2, 18.2)
            .build()
    }

    fn plan(store: &GtfsStore) -> PlanTripResponse {
        let config = PlannerConfig::default().without_fallback_services();
        let planner = Planner::new(store, &config);
        let request = PlanRequest::new(
            "A",
            "C",
            monday(),
            ServiceTime::parse("07:00").unwrap(),
            QueryMode::DepartAfter,
        );
        let outcome = planner.plan(&request).unwrap();
        PlanTripResponse::from_outcome(&outcome, store)
    }

    #[test]
    fn transfer_itinerary_conversion() {
        let store = store();
        let response = plan(&store);

        assert_eq!(response.status, PlanStatus::Ok);
        assert!(response.message.is_none());
        assert_eq!(response.itineraries.len(), 1);

        let it = &response.itineraries[0];
        assert_eq!(it.kind, KindResult::Transfer);
        assert_eq!(it.departure_time, "08:00");
        assert_eq!(it.arrival_time, "09:30");
        assert_eq!(it.duration_mins, 90);
        assert_eq!(it.duration_text, "1h 30m");

        let transfer = it.transfer.as_ref().unwrap();
        assert_eq!(transfer.stop.id, "B");
        assert_eq!(transfer.wait_mins, 5);

        assert_eq!(it.segments.len(), 2);
        let first = &it.segments[0];
        assert_eq!(first.route_name, "10");
        assert_eq!(first.route_color, "000000");
        assert_eq!(first.route_text_color, "FFFFFF");
        assert_eq!(first.stops.len(), 2);
        assert_eq!(first.stops[0].departure_time.as_deref(), Some("08:00"));
        assert!(!first.path.approximate);
        assert_eq!(first.path.points.len(), 3);

        let second = &it.segments[1];
        assert!(second.path.approximate);
        assert_eq!(second.path.points.len(), 2);
    }

    #[test]
    fn empty_outcomes_carry_messages() {
        let store = store();

        let response = PlanTripResponse::from_outcome(&PlanOutcome::NoServiceForDate, &store);
        assert_eq!(response.status, PlanStatus::NoService);
        assert_eq!(
            response.message.as_deref(),
            Some("No service available on the selected date")
        );
        assert!(response.itineraries.is_empty());

        let response = PlanTripResponse::from_outcome(&PlanOutcome::NoItineraryFound, &store);
        assert_eq!(response.status, PlanStatus::NoItinerary);
    }

    #[test]
    fn serializes_status_and_kind_in_snake_case() {
        let store = store();
        let json = serde_json::to_value(plan(&store)).unwrap();

        assert_eq!(json["status"], "ok");
        assert!(json.get("message").is_none());
        assert_eq!(json["itineraries"][0]["kind"], "transfer");
        assert_eq!(json["itineraries"][0]["segments"][0]["path"]["points"][0][0], 47.0);

        let none = PlanTripResponse::from_outcome(&PlanOutcome::NoItineraryFound, &store);
        let json = serde_json::to_value(none).unwrap();
        assert_eq!(json["status"], "no_itinerary");
    }

    #[test]
    fn plan_request_mode_defaults() {
        let req: PlanTripRequest = serde_json::from_str(
            r#"{"from":"A","to":"C","date":"2024-01-08","time":"07:00"}"#,
        )
        .unwrap();
        assert_eq!(req.mode, ModeParam::DepartAfter);

        let req: PlanTripRequest = serde_json::from_str(
            r#"{"from":"A","to":"C","date":"2024-01-08","time":"07:00","mode":"arrive_by"}"#,
        )
        .unwrap();
        assert_eq!(QueryMode::from(req.mode), QueryMode::ArriveBy);
    }

    #[test]
    fn call_without_known_stop() {
        let store = store();
        let st = StopTime {
            trip_id: crate::domain::TripId::new("T1"),
            stop_id: StopId::new("GONE"),
            sequence: 1,
            arrival_time: "bad".to_string(),
            departure_time: "08:00:00".to_string(),
        };

        let call = CallResult::from_stop_time(&st, &store);
        assert_eq!(call.name, "");
        assert_eq!(call.lat, None);
        assert_eq!(call.arrival_time, None);
        assert_eq!(call.departure_time.as_deref(), Some("08:00"));
    }
}
