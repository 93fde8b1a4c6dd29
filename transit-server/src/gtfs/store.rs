//! The in-memory GTFS store.
//!
//! A `GtfsStore` is built once from the eight loaded tables and never
//! changes afterwards. Building it validates cross-table references and
//! precomputes the lookups the planner needs: each trip's stop times in
//! sequence order, the trips touching each stop, exceptions per date and
//! shape points per shape.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::domain::{
    Agency, CalendarEntry, CalendarException, Route, RouteId, ShapeId, ShapePoint, Stop, StopId,
    StopTime, Trip, TripId,
};

use super::parse::{self, Converted};
use super::table::{Table, TableName};

/// Shortest stop-name query that [`GtfsStore::search_stops`] answers.
pub const MIN_STOP_QUERY_LEN: usize = 2;

/// The raw tables of one feed, as handed over by the loader.
#[derive(Debug, Clone, Default)]
pub struct FeedTables {
    pub agency: Table,
    pub routes: Table,
    pub stops: Table,
    pub trips: Table,
    pub stop_times: Table,
    pub calendar: Table,
    pub calendar_dates: Table,
    pub shapes: Table,
}

impl FeedTables {
    /// Mutable access to a table by name.
    pub fn table_mut(&mut self, name: TableName) -> &mut Table {
        match name {
            TableName::Agency => &mut self.agency,
            TableName::Routes => &mut self.routes,
            TableName::Stops => &mut self.stops,
            TableName::Trips => &mut self.trips,
            TableName::StopTimes => &mut self.stop_times,
            TableName::Calendar => &mut self.calendar,
            TableName::CalendarDates => &mut self.calendar_dates,
            TableName::Shapes => &mut self.shapes,
        }
    }
}

/// Row counts for one table after building the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub loaded: usize,
    /// Malformed, duplicate or dangling rows
    pub skipped: usize,
}

/// Row counts for every table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    tables: BTreeMap<TableName, TableStats>,
}

impl LoadStats {
    /// Counts for one table.
    pub fn table(&self, name: TableName) -> TableStats {
        self.tables.get(&name).copied().unwrap_or_default()
    }

    /// Total skipped rows across all tables.
    pub fn total_skipped(&self) -> usize {
        self.tables.values().map(|s| s.skipped).sum()
    }

    fn record(&mut self, name: TableName, loaded: usize, skipped: usize) {
        if skipped > 0 {
            warn!(table = %name, loaded, skipped, "skipped rows while loading table");
        } else {
            debug!(table = %name, loaded, "loaded table");
        }
        self.tables.insert(name, TableStats { loaded, skipped });
    }
}

/// A trip together with its route and ordered stop times.
#[derive(Debug, Clone, Copy)]
pub struct TripSchedule<'a> {
    pub trip: &'a Trip,
    pub route: &'a Route,
    /// Sorted by stop sequence
    pub stop_times: &'a [StopTime],
}

impl<'a> TripSchedule<'a> {
    /// Position of the first visit to a stop.
    pub fn position(&self, stop: &StopId) -> Option<usize> {
        self.stop_times.iter().position(|st| &st.stop_id == stop)
    }

    /// Positions of `from` and `to` if the trip visits `from` strictly before `to`.
    ///
    /// A trip serving the two stops in the opposite direction returns `None`.
    pub fn positions_in_order(&self, from: &StopId, to: &StopId) -> Option<(usize, usize)> {
        let board = self.position(from)?;
        let alight = self.position(to)?;
        (board < alight).then_some((board, alight))
    }

    /// Stop times from `board` to `alight`, inclusive.
    pub fn slice(&self, board: usize, alight: usize) -> &'a [StopTime] {
        &self.stop_times[board..=alight]
    }
}

/// An immutable snapshot of one GTFS feed.
#[derive(Debug, Default)]
pub struct GtfsStore {
    agencies: Vec<Agency>,
    stops: Vec<Stop>,
    stop_index: HashMap<StopId, usize>,
    routes: Vec<Route>,
    route_index: HashMap<RouteId, usize>,
    trips: Vec<Trip>,
    trip_index: HashMap<TripId, usize>,
    /// Parallel to `trips`, each sorted by sequence
    stop_times: Vec<Vec<StopTime>>,
    /// Trip positions in `trips`, ascending
    trips_by_stop: HashMap<StopId, Vec<usize>>,
    calendar: Vec<CalendarEntry>,
    exceptions_by_date: HashMap<u32, Vec<CalendarException>>,
    shapes: HashMap<ShapeId, Vec<ShapePoint>>,
    stats: LoadStats,
}

impl GtfsStore {
    /// Build a store from loaded tables.
    ///
    /// Never fails: malformed rows, duplicate keys and references to unknown
    /// stops, trips or routes are skipped and counted in [`GtfsStore::stats`].
    pub fn from_tables(tables: &FeedTables) -> Self {
        let mut stats = LoadStats::default();

        let Converted { items: agencies, rejected } =
            parse::convert(TableName::Agency, &tables.agency, parse::agency);
        stats.record(TableName::Agency, agencies.len(), rejected);

        let (stops, stop_index) = {
            let converted = parse::convert(TableName::Stops, &tables.stops, parse::stop);
            let (stops, index, dupes) = unique_by(converted.items, |s| s.id.clone());
            stats.record(TableName::Stops, stops.len(), converted.rejected + dupes);
            (stops, index)
        };

        let (routes, route_index) = {
            let converted = parse::convert(TableName::Routes, &tables.routes, parse::route);
            let (routes, index, dupes) = unique_by(converted.items, |r| r.id.clone());
            stats.record(TableName::Routes, routes.len(), converted.rejected + dupes);
            (routes, index)
        };

        let (trips, trip_index) = {
            let converted = parse::convert(TableName::Trips, &tables.trips, parse::trip);
            let total = converted.items.len();
            let known_route: Vec<Trip> = converted
                .items
                .into_iter()
                .filter(|t| route_index.contains_key(&t.route_id))
                .collect();
            let dangling = total - known_route.len();
            let (trips, index, dupes) = unique_by(known_route, |t| t.id.clone());
            stats.record(
                TableName::Trips,
                trips.len(),
                converted.rejected + dangling + dupes,
            );
            (trips, index)
        };

        let stop_times = {
            let converted =
                parse::convert(TableName::StopTimes, &tables.stop_times, parse::stop_time);
            let mut skipped = converted.rejected;
            let mut per_trip: Vec<Vec<StopTime>> = vec![Vec::new(); trips.len()];
            let mut seen: HashSet<(usize, u32)> = HashSet::new();

            for st in converted.items {
                let Some(&trip_pos) = trip_index.get(&st.trip_id) else {
                    skipped += 1;
                    continue;
                };
                if !stop_index.contains_key(&st.stop_id) || !seen.insert((trip_pos, st.sequence))
                {
                    skipped += 1;
                    continue;
                }
                per_trip[trip_pos].push(st);
            }

            for times in &mut per_trip {
                times.sort_by_key(|st| st.sequence);
            }

            let loaded = per_trip.iter().map(Vec::len).sum();
            stats.record(TableName::StopTimes, loaded, skipped);
            per_trip
        };

        let mut trips_by_stop: HashMap<StopId, Vec<usize>> = HashMap::new();
        for (trip_pos, times) in stop_times.iter().enumerate() {
            for st in times {
                let entry = trips_by_stop.entry(st.stop_id.clone()).or_default();
                if entry.last() != Some(&trip_pos) {
                    entry.push(trip_pos);
                }
            }
        }

        let calendar = {
            let converted =
                parse::convert(TableName::Calendar, &tables.calendar, parse::calendar_entry);
            let (entries, _, dupes) = unique_by(converted.items, |c| c.service_id.clone());
            stats.record(TableName::Calendar, entries.len(), converted.rejected + dupes);
            entries
        };

        let exceptions_by_date = {
            let converted = parse::convert(
                TableName::CalendarDates,
                &tables.calendar_dates,
                parse::calendar_exception,
            );
            let mut skipped = converted.rejected;
            let mut loaded = 0;
            let mut by_date: HashMap<u32, Vec<CalendarException>> = HashMap::new();

            for exception in converted.items {
                let on_date = by_date.entry(exception.date).or_default();
                // At most one exception per (service, date); the first one wins
                if on_date.iter().any(|e| e.service_id == exception.service_id) {
                    skipped += 1;
                    continue;
                }
                on_date.push(exception);
                loaded += 1;
            }

            stats.record(TableName::CalendarDates, loaded, skipped);
            by_date
        };

        let shapes = {
            let converted = parse::convert(TableName::Shapes, &tables.shapes, parse::shape_point);
            let loaded = converted.items.len();
            let mut shapes: HashMap<ShapeId, Vec<ShapePoint>> = HashMap::new();
            for point in converted.items {
                shapes.entry(point.shape_id.clone()).or_default().push(point);
            }
            for points in shapes.values_mut() {
                points.sort_by_key(|p| p.sequence);
            }
            stats.record(TableName::Shapes, loaded, converted.rejected);
            shapes
        };

        info!(
            stops = stops.len(),
            routes = routes.len(),
            trips = trips.len(),
            calendar_entries = calendar.len(),
            skipped_rows = stats.total_skipped(),
            "built GTFS store"
        );

        Self {
            agencies,
            stops,
            stop_index,
            routes,
            route_index,
            trips,
            trip_index,
            stop_times,
            trips_by_stop,
            calendar,
            exceptions_by_date,
            shapes,
            stats,
        }
    }

    /// Row counts from building this store.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// All agencies.
    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    /// All stops, in table order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stop_index.get(id).map(|&i| &self.stops[i])
    }

    /// All routes, in table order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up a route by id.
    pub fn route(&self, id: &str) -> Option<&Route> {
        self.route_index.get(id).map(|&i| &self.routes[i])
    }

    /// All trips with a known route, in table order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Look up a trip by id.
    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trip_index.get(id).map(|&i| &self.trips[i])
    }

    /// Stop times of a trip, sorted by sequence. Empty for unknown trips.
    pub fn stop_times(&self, trip_id: &str) -> &[StopTime] {
        self.trip_index
            .get(trip_id)
            .map(|&i| self.stop_times[i].as_slice())
            .unwrap_or(&[])
    }

    /// All weekly calendar entries.
    pub fn calendar(&self) -> &[CalendarEntry] {
        &self.calendar
    }

    /// Calendar exceptions dated exactly `yyyymmdd`.
    pub fn exceptions_on(&self, yyyymmdd: u32) -> &[CalendarException] {
        self.exceptions_by_date
            .get(&yyyymmdd)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Points of a shape, sorted by sequence. Empty for unknown shapes.
    pub fn shape(&self, shape_id: &str) -> &[ShapePoint] {
        self.shapes.get(shape_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stops whose name contains `query`, ignoring case, in table order.
    ///
    /// Queries shorter than [`MIN_STOP_QUERY_LEN`] characters match nothing.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<&Stop> {
        let query = query.trim();
        if query.chars().count() < MIN_STOP_QUERY_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.stops
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Schedules of every trip that visits a stop, in trip table order.
    pub fn schedules_at<'a>(&'a self, stop: &StopId) -> impl Iterator<Item = TripSchedule<'a>> {
        self.trips_by_stop
            .get(stop)
            .into_iter()
            .flatten()
            .filter_map(move |&i| self.schedule_at(i))
    }

    /// Schedule of one trip.
    pub fn schedule(&self, trip_id: &str) -> Option<TripSchedule<'_>> {
        self.trip_index.get(trip_id).and_then(|&i| self.schedule_at(i))
    }

    fn schedule_at(&self, trip_pos: usize) -> Option<TripSchedule<'_>> {
        let trip = self.trips.get(trip_pos)?;
        Some(TripSchedule {
            trip,
            route: self.route(trip.route_id.as_str())?,
            stop_times: &self.stop_times[trip_pos],
        })
    }
}

/// Keep the first item for each key, returning the kept items, their index
/// and the number of duplicates dropped.
fn unique_by<T, K, F>(items: Vec<T>, key: F) -> (Vec<T>, HashMap<K, usize>, usize)
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut kept = Vec::with_capacity(items.len());
    let mut index = HashMap::with_capacity(items.len());
    let mut dupes = 0;

    for item in items {
        let k = key(&item);
        if index.contains_key(&k) {
            dupes += 1;
            continue;
        }
        index.insert(k, kept.len());
        kept.push(item);
    }

    (kept, index, dupes)
}
