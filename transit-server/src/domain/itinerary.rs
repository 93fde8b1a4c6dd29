//! Itinerary types.
//!
//! An `Itinerary` is one answer to a planning query: a single trip from
//! origin to destination, or two trips joined at a transfer stop. Both borrow
//! from the loaded feed and live only as long as the query that built them.

use chrono::Duration;

use super::{DomainError, Route, ServiceTime, Stop, StopTime, Trip};

/// One vehicle ride from a boarding stop to an alighting stop.
///
/// Times are validated at construction, so `departure_time()` and
/// `arrival_time()` never fail.
///
/// # Invariants
///
/// - At least two stop times, the first at `board` and the last at `alight`
/// - Arrival is not before departure
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    route: &'a Route,
    trip: &'a Trip,
    board: &'a Stop,
    alight: &'a Stop,
    stop_times: &'a [StopTime],
    departure: ServiceTime,
    arrival: ServiceTime,
}

impl<'a> Segment<'a> {
    /// Construct a segment from the stop times between boarding and
    /// alighting, inclusive.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - Fewer than two stop times are given
    /// - The first/last stop time is not at `board`/`alight`
    /// - The boarding departure or alighting arrival does not parse
    /// - The arrival is before the departure
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::{Route, RouteId, Segment, ServiceId, Stop, StopId, StopTime, Trip, TripId};
    ///
    /// let stop = |id: &str| Stop { id: StopId::new(id), name: id.into(), lat: 0.0, lon: 0.0 };
    /// let (a, b) = (stop("A"), stop("B"));
    /// let route = Route {
    ///     id: RouteId::new("R1"),
    ///     agency_id: String::new(),
    ///     short_name: "1".into(),
    ///     long_name: String::new(),
    ///     color: None,
    ///     text_color: None,
    /// };
    /// let trip = Trip {
    ///     id: TripId::new("T1"),
    ///     route_id: route.id.clone(),
    ///     service_id: ServiceId::new("S1"),
    ///     headsign: None,
    ///     shape_id: None,
    /// };
    /// let times = vec![
    ///     StopTime { trip_id: trip.id.clone(), stop_id: a.id.clone(), sequence: 1,
    ///                arrival_time: "08:00:00".into(), departure_time: "08:00:00".into() },
    ///     StopTime { trip_id: trip.id.clone(), stop_id: b.id.clone(), sequence: 2,
    ///                arrival_time: "08:20:00".into(), departure_time: "08:21:00".into() },
    /// ];
    ///
    /// let segment = Segment::new(&route, &trip, &times, &a, &b).unwrap();
    /// assert_eq!(segment.departure_time().to_string(), "08:00");
    /// assert_eq!(segment.arrival_time().to_string(), "08:20");
    /// assert_eq!(segment.duration().num_minutes(), 20);
    /// ```
    pub fn new(
        route: &'a Route,
        trip: &'a Trip,
        stop_times: &'a [StopTime],
        board: &'a Stop,
        alight: &'a Stop,
    ) -> Result<Self, DomainError> {
        let (first, last) = match stop_times {
            [first, .., last] => (first, last),
            _ => {
                return Err(DomainError::InvalidSegment(
                    "needs at least a boarding and an alighting stop",
                ));
            }
        };

        if first.stop_id != board.id {
            return Err(DomainError::InvalidSegment(
                "first stop time is not at the boarding stop",
            ));
        }
        if last.stop_id != alight.id {
            return Err(DomainError::InvalidSegment(
                "last stop time is not at the alighting stop",
            ));
        }

        let departure = first.departure()?;
        let arrival = last.arrival()?;
        if arrival < departure {
            return Err(DomainError::NegativeDuration { departure, arrival });
        }

        Ok(Self {
            route,
            trip,
            board,
            alight,
            stop_times,
            departure,
            arrival,
        })
    }

    /// Returns the route this segment rides.
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// Returns the trip this segment rides.
    pub fn trip(&self) -> &'a Trip {
        self.trip
    }

    /// Returns the boarding stop.
    pub fn board_stop(&self) -> &'a Stop {
        self.board
    }

    /// Returns the alighting stop.
    pub fn alight_stop(&self) -> &'a Stop {
        self.alight
    }

    /// Returns the stop times from boarding to alighting, inclusive.
    pub fn stop_times(&self) -> &'a [StopTime] {
        self.stop_times
    }

    /// Returns the number of stops after boarding, including the alighting stop.
    pub fn stop_count(&self) -> usize {
        self.stop_times.len() - 1
    }

    /// Returns the departure time from the boarding stop.
    pub fn departure_time(&self) -> ServiceTime {
        self.departure
    }

    /// Returns the arrival time at the alighting stop.
    pub fn arrival_time(&self) -> ServiceTime {
        self.arrival
    }

    /// Returns the time spent on board.
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }
}

/// An interchange between the two segments of a transfer itinerary.
#[derive(Debug, Clone, Copy)]
pub struct Transfer<'a> {
    /// Where the change happens
    pub stop: &'a Stop,
    /// Time between arriving on the first trip and leaving on the second
    pub wait: Duration,
}

/// Whether an itinerary needs a change of vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItineraryKind {
    Direct,
    Transfer,
}

/// A complete answer from origin to destination.
///
/// # Invariants
///
/// - One segment (direct) or two segments (one transfer)
/// - With two segments, the first alights where the second boards, and the
///   second departs no earlier than the first arrives
#[derive(Debug, Clone)]
pub struct Itinerary<'a> {
    segments: Vec<Segment<'a>>,
    transfer: Option<Transfer<'a>>,
}

impl<'a> Itinerary<'a> {
    /// A single-trip itinerary.
    pub fn direct(segment: Segment<'a>) -> Self {
        Self {
            segments: vec![segment],
            transfer: None,
        }
    }

    /// A two-trip itinerary changing at the stop the segments share.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the segments don't share the interchange stop or the
    /// second departs before the first arrives.
    pub fn with_transfer(first: Segment<'a>, second: Segment<'a>) -> Result<Self, DomainError> {
        if first.alight.id != second.board.id {
            return Err(DomainError::StopsNotConnected(
                first.alight.id.clone(),
                second.board.id.clone(),
            ));
        }
        if second.departure < first.arrival {
            return Err(DomainError::NegativeDuration {
                departure: second.departure,
                arrival: first.arrival,
            });
        }

        let transfer = Transfer {
            stop: first.alight,
            wait: second.departure.signed_duration_since(first.arrival),
        };

        Ok(Self {
            segments: vec![first, second],
            transfer: Some(transfer),
        })
    }

    /// Returns the segments in travel order.
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Returns the interchange, if this itinerary has one.
    pub fn transfer(&self) -> Option<&Transfer<'a>> {
        self.transfer.as_ref()
    }

    /// Returns whether this is a direct or transfer itinerary.
    pub fn kind(&self) -> ItineraryKind {
        if self.transfer.is_some() {
            ItineraryKind::Transfer
        } else {
            ItineraryKind::Direct
        }
    }

    /// Returns true if no change of vehicle is needed.
    pub fn is_direct(&self) -> bool {
        self.kind() == ItineraryKind::Direct
    }

    /// Returns the departure time from the origin.
    pub fn departure_time(&self) -> ServiceTime {
        // Non-empty by construction
        self.segments[0].departure
    }

    /// Returns the arrival time at the destination.
    pub fn arrival_time(&self) -> ServiceTime {
        self.segments[self.segments.len() - 1].arrival
    }

    /// Returns the total time from origin departure to destination arrival.
    pub fn duration(&self) -> Duration {
        self.arrival_time()
            .signed_duration_since(self.departure_time())
    }

    /// Returns the total duration in whole minutes.
    pub fn duration_mins(&self) -> i64 {
        self.duration().num_minutes()
    }
}
