//! Itinerary ranking for search results.

use crate::domain::Itinerary;

use super::QueryMode;

/// Merge, order and truncate itineraries.
///
/// Direct itineraries come before transfers, then the whole list is sorted
/// by departure time (depart-after) or arrival time (arrive-by). The sort is
/// stable, so ties keep the direct-first, search order. At most
/// `max_results` itineraries are returned.
pub fn rank_itineraries<'a>(
    direct: Vec<Itinerary<'a>>,
    transfers: Vec<Itinerary<'a>>,
    mode: QueryMode,
    max_results: usize,
) -> Vec<Itinerary<'a>> {
    let mut all = direct;
    all.extend(transfers);

    match mode {
        QueryMode::DepartAfter => all.sort_by_key(|it| it.departure_time()),
        QueryMode::ArriveBy => all.sort_by_key(|it| it.arrival_time()),
    }

    all.truncate(max_results);
    all
}
