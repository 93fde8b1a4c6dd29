//! One-change itinerary search.
//!
//! Candidate transfer stops are those reachable from the origin and from
//! which the destination is reachable, each on an active trip. Every pair
//! of a first leg into the candidate and a second leg out of it is kept if
//! the wait between them falls inside the configured transfer window.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace};

use crate::domain::{Itinerary, Segment, ServiceTime, StopId};
use crate::gtfs::{GtfsStore, TripSchedule};

use super::calendar::ActiveServices;
use super::direct::{active_schedules, ride};
use super::{PlannerConfig, QueryMode};

/// Stops touched by any of the schedules.
fn touched<'a>(schedules: &[TripSchedule<'a>]) -> HashSet<&'a StopId> {
    schedules
        .iter()
        .flat_map(|s| s.stop_times.iter().map(|st| &st.stop_id))
        .collect()
}

/// Find every itinerary from `origin` to `destination` with exactly one change.
///
/// Candidates are visited in stop id order; within a candidate, pairs follow
/// trip table order of the first leg then the second.
pub fn find_transfers<'a>(
    store: &'a GtfsStore,
    active: &ActiveServices,
    config: &PlannerConfig,
    origin: &StopId,
    destination: &StopId,
    mode: QueryMode,
    reference: ServiceTime,
) -> Vec<Itinerary<'a>> {
    let from_origin: Vec<TripSchedule<'a>> = active_schedules(store, active, origin).collect();
    let to_destination: Vec<TripSchedule<'a>> =
        active_schedules(store, active, destination).collect();

    let reachable = touched(&from_origin);
    let candidates: BTreeSet<&StopId> = touched(&to_destination)
        .into_iter()
        .filter(|stop| reachable.contains(stop))
        .filter(|&stop| stop != origin && stop != destination)
        .collect();

    trace!(%origin, %destination, candidates = candidates.len(), "transfer candidates");

    let mut itineraries = Vec::new();
    for via in candidates {
        let first_legs: Vec<Segment<'a>> = from_origin
            .iter()
            .filter_map(|&s| {
                let (board, alight) = s.positions_in_order(origin, via)?;
                ride(store, s, board, alight)
            })
            .filter(|seg| mode != QueryMode::DepartAfter || seg.departure_time() >= reference)
            .collect();
        if first_legs.is_empty() {
            continue;
        }

        let second_legs: Vec<Segment<'a>> = to_destination
            .iter()
            .filter_map(|&s| {
                let (board, alight) = s.positions_in_order(via, destination)?;
                ride(store, s, board, alight)
            })
            .filter(|seg| mode != QueryMode::ArriveBy || seg.arrival_time() <= reference)
            .collect();

        for first in &first_legs {
            for second in &second_legs {
                if first.trip().id == second.trip().id {
                    continue;
                }

                let wait = second
                    .departure_time()
                    .signed_duration_since(first.arrival_time());
                if !config.accepts_wait(wait) {
                    continue;
                }

                match Itinerary::with_transfer(*first, *second) {
                    Ok(itinerary) => itineraries.push(itinerary),
                    Err(e) => debug!(%via, error = %e, "rejected transfer"),
                }
            }
        }
    }

    debug!(
        %origin,
        %destination,
        found = itineraries.len(),
        "transfer search finished"
    );
    itineraries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceDate;
    use crate::gtfs::test_feed::FeedBuilder;
    use crate::planner::calendar::active_services;
    use chrono::NaiveDate;

    fn time(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    fn monday() -> ServiceDate {
        ServiceDate::new(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
    }

    /// Route 1 runs A -> B, route 2 runs B -> C with departures at several waits.
    fn feed() -> FeedBuilder {
        FeedBuilder::new()
            .stops(&["A", "B", "C", "X"])
            .route("R1", "1")
            .route("R2", "2")
            .calendar("S1", "1111111", 20240101, 20241231)
            .trip(
                "IN",
                "R1",
                "S1",
                &[("A", "08:00:00", "08:00:00"), ("B", "08:20:00", "08:20:00")],
            )
            // Waits of 2, 3, 20 and 21 minutes
            .trip("W2", "R2", "S1", &[("B", "08:22:00", "08:22:00"), ("C", "08:50:00", "08:50:00")])
            .trip("W3", "R2", "S1", &[("B", "08:23:00", "08:23:00"), ("C", "08:51:00", "08:51:00")])
            .trip("W20", "R2", "S1", &[("B", "08:40:00", "08:40:00"), ("C", "09:05:00", "09:05:00")])
            .trip("W21", "R2", "S1", &[("B", "08:41:00", "08:41:00"), ("C", "09:06:00", "09:06:00")])
    }

    fn second_legs(found: &[Itinerary<'_>]) -> Vec<String> {
        found
            .iter()
            .map(|it| it.segments()[1].trip().id.to_string())
            .collect()
    }

    fn search(store: &GtfsStore, config: &PlannerConfig, mode: QueryMode, at: &str) -> Vec<String> {
        let active = active_services(store, config, monday());
        let found = find_transfers(
            store,
            &active,
            config,
            &StopId::new("A"),
            &StopId::new("C"),
            mode,
            time(at),
        );
        second_legs(&found)
    }

    fn config() -> PlannerConfig {
        PlannerConfig::default().without_fallback_services()
    }

    #[test]
    fn waits_bounded_by_window() {
        let store = feed().build();

        assert_eq!(
            search(&store, &config(), QueryMode::DepartAfter, "07:00"),
            vec!["W3", "W20"]
        );
    }

    #[test]
    fn custom_window() {
        let store = feed().build();
        let config = config().with_transfer_window(1, 30);

        assert_eq!(
            search(&store, &config, QueryMode::DepartAfter, "07:00"),
            vec!["W2", "W3", "W20", "W21"]
        );
    }

    #[test]
    fn transfer_details() {
        let store = feed().build();
        let config = config();
        let active = active_services(&store, &config, monday());
        let found = find_transfers(
            &store,
            &active,
            &config,
            &StopId::new("A"),
            &StopId::new("C"),
            QueryMode::DepartAfter,
            time("07:00"),
        );

        let it = &found[0];
        let transfer = it.transfer().unwrap();
        assert_eq!(transfer.stop.id.as_str(), "B");
        assert_eq!(transfer.wait.num_minutes(), 3);
        assert_eq!(it.departure_time().minutes(), 480);
        assert_eq!(it.arrival_time().minutes(), 531);
        assert_eq!(it.duration_mins(), 51);
    }

    #[test]
    fn depart_after_filters_first_leg() {
        let store = feed().build();
        assert!(search(&store, &config(), QueryMode::DepartAfter, "08:01").is_empty());
    }

    #[test]
    fn arrive_by_filters_second_leg() {
        let store = feed().build();

        assert_eq!(
            search(&store, &config(), QueryMode::ArriveBy, "09:00"),
            vec!["W3"]
        );
        assert!(search(&store, &config(), QueryMode::ArriveBy, "08:50").is_empty());
    }

    #[test]
    fn origin_and_destination_are_not_candidates() {
        // One trip A -> C -> A plus another from C; C must not be a transfer
        // to itself and A must not be reused as an interchange.
        let store = FeedBuilder::new()
            .stops(&["A", "C"])
            .route("R1", "1")
            .calendar("S1", "1111111", 20240101, 20241231)
            .trip(
                "LOOP",
                "R1",
                "S1",
                &[
                    ("A", "08:00:00", "08:00:00"),
                    ("C", "08:10:00", "08:10:00"),
                    ("A", "08:20:00", "08:20:00"),
                ],
            )
            .trip(
                "SHUTTLE",
                "R1",
                "S1",
                &[("A", "08:25:00", "08:25:00"), ("C", "08:35:00", "08:35:00")],
            )
            .build();

        assert!(search(&store, &config(), QueryMode::DepartAfter, "07:00").is_empty());
    }

    #[test]
    fn same_trip_is_not_a_transfer() {
        // A -> B -> C on one trip; B is a candidate but both legs would be one trip
        let store = FeedBuilder::new()
            .stops(&["A", "B", "C"])
            .route("R1", "1")
            .calendar("S1", "1111111", 20240101, 20241231)
            .trip(
                "T",
                "R1",
                "S1",
                &[
                    ("A", "08:00:00", "08:00:00"),
                    ("B", "08:10:00", "08:15:00"),
                    ("C", "08:30:00", "08:30:00"),
                ],
            )
            .build();

        assert!(search(&store, &config(), QueryMode::DepartAfter, "07:00").is_empty());
    }

    #[test]
    fn candidates_in_stop_id_order() {
        // Two interchanges, Y listed first in the stop table, X sorts first
        let store = FeedBuilder::new()
            .stops(&["A", "Y", "X", "C"])
            .route("R1", "1")
            .calendar("S1", "1111111", 20240101, 20241231)
            .trip("AY", "R1", "S1", &[("A", "08:00:00", "08:00:00"), ("Y", "08:10:00", "08:10:00")])
            .trip("YC", "R1", "S1", &[("Y", "08:15:00", "08:15:00"), ("C", "08:30:00", "08:30:00")])
            .trip("AX", "R1", "S1", &[("A", "08:00:00", "08:00:00"), ("X", "08:12:00", "08:12:00")])
            .trip("XC", "R1", "S1", &[("X", "08:17:00", "08:17:00"), ("C", "08:40:00", "08:40:00")])
            .build();

        assert_eq!(
            search(&store, &config(), QueryMode::DepartAfter, "07:00"),
            vec!["XC", "YC"]
        );
    }

    #[test]
    fn inactive_second_leg_ignored() {
        let store = feed()
            .trip("OFF", "R2", "S9", &[("B", "08:25:00", "08:25:00"), ("C", "08:45:00", "08:45:00")])
            .build();

        assert_eq!(
            search(&store, &config(), QueryMode::DepartAfter, "07:00"),
            vec!["W3", "W20"]
        );
    }
}
