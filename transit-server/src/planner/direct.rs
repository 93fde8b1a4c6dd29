//! Direct (no-change) itinerary search.

use tracing::debug;

use crate::domain::{Itinerary, Segment, ServiceTime, StopId};
use crate::gtfs::{GtfsStore, TripSchedule};

use super::QueryMode;
use super::calendar::ActiveServices;

/// Build the segment riding `schedule` from position `board` to `alight`.
///
/// Returns `None` (and logs why) if the stop times there cannot form a
/// segment, e.g. because a time doesn't parse.
pub(super) fn ride<'a>(
    store: &'a GtfsStore,
    schedule: TripSchedule<'a>,
    board: usize,
    alight: usize,
) -> Option<Segment<'a>> {
    let times = schedule.slice(board, alight);
    let board_stop = store.stop(times[0].stop_id.as_str())?;
    let alight_stop = store.stop(times[times.len() - 1].stop_id.as_str())?;

    match Segment::new(schedule.route, schedule.trip, times, board_stop, alight_stop) {
        Ok(segment) => Some(segment),
        Err(e) => {
            debug!(trip = %schedule.trip.id, error = %e, "skipping trip");
            None
        }
    }
}

/// Active trip schedules serving a stop, in trip table order.
pub(super) fn active_schedules<'a, 'q>(
    store: &'a GtfsStore,
    active: &'q ActiveServices,
    stop: &'q StopId,
) -> impl Iterator<Item = TripSchedule<'a>> + 'q
where
    'a: 'q,
{
    store
        .schedules_at(stop)
        .filter(move |s| active.contains(&s.trip.service_id))
}

/// Find every single-trip itinerary from `origin` to `destination`.
///
/// A trip qualifies if it runs on an active service and visits the origin
/// before the destination. Results follow the trip table order.
pub fn find_direct<'a>(
    store: &'a GtfsStore,
    active: &ActiveServices,
    origin: &StopId,
    destination: &StopId,
    mode: QueryMode,
    reference: ServiceTime,
) -> Vec<Itinerary<'a>> {
    let itineraries: Vec<Itinerary<'a>> = active_schedules(store, active, origin)
        .filter_map(|schedule| {
            let (board, alight) = schedule.positions_in_order(origin, destination)?;
            ride(store, schedule, board, alight)
        })
        .filter(|seg| mode.admits(seg.departure_time(), seg.arrival_time(), reference))
        .map(Itinerary::direct)
        .collect();

    debug!(
        %origin,
        %destination,
        found = itineraries.len(),
        "direct search finished"
    );
    itineraries
}
