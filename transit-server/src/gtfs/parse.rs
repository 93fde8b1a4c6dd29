//! Row-to-entity conversion for each GTFS table.
//!
//! Each converter either produces a validated entity or names the reason the
//! row was rejected. Rejected rows are counted by the caller; they never fail
//! the table.

use tracing::trace;

use crate::domain::{
    Agency, CalendarEntry, CalendarException, ExceptionType, Route, RouteId, ServiceId, ShapeId,
    ShapePoint, Stop, StopId, StopTime, Trip, TripId, parse_gtfs_date,
};

use super::table::{Row, Table, TableName};

/// Why a row was rejected.
pub(crate) type Rejection = &'static str;

/// Entities converted from one table plus the number of rejected rows.
#[derive(Debug)]
pub(crate) struct Converted<T> {
    pub items: Vec<T>,
    pub rejected: usize,
}

/// Convert every row of a table, counting rejects.
pub(crate) fn convert<T>(
    name: TableName,
    table: &Table,
    convert_row: impl Fn(Row<'_>) -> Result<T, Rejection>,
) -> Converted<T> {
    let mut items = Vec::with_capacity(table.len());
    let mut rejected = table.unreadable_rows();

    for (line, row) in table.rows().enumerate() {
        match convert_row(row) {
            Ok(item) => items.push(item),
            Err(reason) => {
                rejected += 1;
                trace!(table = %name, row = line + 1, reason, "rejected row");
            }
        }
    }

    Converted { items, rejected }
}

fn required<'a>(row: &Row<'a>, column: &str, reason: Rejection) -> Result<&'a str, Rejection> {
    row.optional(column).ok_or(reason)
}

fn coordinate(row: &Row<'_>, column: &str) -> Result<f64, Rejection> {
    row.get(column)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or("non-numeric coordinate")
}

fn sequence(row: &Row<'_>, column: &str) -> Result<u32, Rejection> {
    row.get(column)
        .parse()
        .map_err(|_| "non-numeric sequence")
}

fn colour(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim_start_matches('#'))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn agency(row: Row<'_>) -> Result<Agency, Rejection> {
    Ok(Agency {
        id: row.get("agency_id").to_string(),
        name: row.get("agency_name").to_string(),
        url: row.get("agency_url").to_string(),
        timezone: row.get("agency_timezone").to_string(),
    })
}

pub(crate) fn stop(row: Row<'_>) -> Result<Stop, Rejection> {
    Ok(Stop {
        id: StopId::new(required(&row, "stop_id", "missing stop_id")?),
        name: row.get("stop_name").to_string(),
        lat: coordinate(&row, "stop_lat")?,
        lon: coordinate(&row, "stop_lon")?,
    })
}

pub(crate) fn route(row: Row<'_>) -> Result<Route, Rejection> {
    Ok(Route {
        id: RouteId::new(required(&row, "route_id", "missing route_id")?),
        agency_id: row.get("agency_id").to_string(),
        short_name: row.get("route_short_name").to_string(),
        long_name: row.get("route_long_name").to_string(),
        color: colour(row.optional("route_color")),
        text_color: colour(row.optional("route_text_color")),
    })
}

pub(crate) fn trip(row: Row<'_>) -> Result<Trip, Rejection> {
    Ok(Trip {
        id: TripId::new(required(&row, "trip_id", "missing trip_id")?),
        route_id: RouteId::new(required(&row, "route_id", "missing route_id")?),
        service_id: ServiceId::new(required(&row, "service_id", "missing service_id")?),
        headsign: row.optional("trip_headsign").map(str::to_string),
        shape_id: row.optional("shape_id").map(ShapeId::new),
    })
}

pub(crate) fn stop_time(row: Row<'_>) -> Result<StopTime, Rejection> {
    Ok(StopTime {
        trip_id: TripId::new(required(&row, "trip_id", "missing trip_id")?),
        stop_id: StopId::new(required(&row, "stop_id", "missing stop_id")?),
        sequence: sequence(&row, "stop_sequence")?,
        arrival_time: row.get("arrival_time").to_string(),
        departure_time: row.get("departure_time").to_string(),
    })
}

pub(crate) fn calendar_entry(row: Row<'_>) -> Result<CalendarEntry, Rejection> {
    const DAYS: [&str; 7] = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];

    let mut days = [false; 7];
    for (flag, column) in days.iter_mut().zip(DAYS) {
        *flag = row.get(column) == "1";
    }

    Ok(CalendarEntry {
        service_id: ServiceId::new(required(&row, "service_id", "missing service_id")?),
        days,
        start_date: parse_gtfs_date(row.get("start_date")).ok_or("non-numeric start_date")?,
        end_date: parse_gtfs_date(row.get("end_date")).ok_or("non-numeric end_date")?,
    })
}

pub(crate) fn calendar_exception(row: Row<'_>) -> Result<CalendarException, Rejection> {
    Ok(CalendarException {
        service_id: ServiceId::new(required(&row, "service_id", "missing service_id")?),
        date: parse_gtfs_date(row.get("date")).ok_or("non-numeric date")?,
        kind: ExceptionType::from_code(row.get("exception_type"))
            .ok_or("unknown exception_type")?,
    })
}

pub(crate) fn shape_point(row: Row<'_>) -> Result<ShapePoint, Rejection> {
    Ok(ShapePoint {
        shape_id: ShapeId::new(required(&row, "shape_id", "missing shape_id")?),
        sequence: sequence(&row, "shape_pt_sequence")?,
        lat: coordinate(&row, "shape_pt_lat")?,
        lon: coordinate(&row, "shape_pt_lon")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: TableName, text: &str) -> Table {
        Table::parse(name, text).unwrap()
    }

    #[test]
    fn stops_with_bad_coordinates_are_rejected() {
        let t = table(
            TableName::Stops,
            "stop_id,stop_name,stop_lat,stop_lon\nA,Alpha,47.1,18.4\nB,Beta,north,18.5\n,NoId,1,1\n",
        );
        let out = convert(TableName::Stops, &t, stop);

        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].id, StopId::new("A"));
        assert_eq!(out.rejected, 2);
    }

    #[test]
    fn route_colours_are_normalised() {
        let t = table(
            TableName::Routes,
            "route_id,route_short_name,route_color,route_text_color\nR1,10,#E30613,\nR2,11\n",
        );
        let out = convert(TableName::Routes, &t, route);

        assert_eq!(out.items[0].color.as_deref(), Some("E30613"));
        assert_eq!(out.items[0].text_color, None);
        assert_eq!(out.items[1].color, None);
        assert_eq!(out.items[1].color_or_default(), "000000");
    }

    #[test]
    fn trips_need_route_and_service() {
        let t = table(
            TableName::Trips,
            "route_id,service_id,trip_id,shape_id\nR1,HP,T1,SH1\nR1,,T2,\n,HP,T3,\n",
        );
        let out = convert(TableName::Trips, &t, trip);

        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].shape_id, Some(ShapeId::new("SH1")));
        assert_eq!(out.rejected, 2);
    }

    #[test]
    fn stop_times_need_numeric_sequence() {
        let t = table(
            TableName::StopTimes,
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
             T1,08:00:00,08:00:00,A,1\n\
             T1,08:10:00,08:10:00,B,two\n\
             T1,,,C,3\n",
        );
        let out = convert(TableName::StopTimes, &t, stop_time);

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.rejected, 1);
        // Empty times are kept; they only matter if a search boards or alights there
        assert_eq!(out.items[1].arrival_time, "");
    }

    #[test]
    fn calendar_flags_and_dates() {
        let t = table(
            TableName::Calendar,
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             S1,1,0,0,0,0,0,1,20240101,20240131\n\
             S2,1,1,1,1,1,0,0,2024-01-01,20240131\n",
        );
        let out = convert(TableName::Calendar, &t, calendar_entry);

        assert_eq!(out.items.len(), 1);
        assert_eq!(out.rejected, 1);
        assert_eq!(
            out.items[0].days,
            [true, false, false, false, false, false, true]
        );
        assert_eq!(out.items[0].start_date, 20240101);
        assert_eq!(out.items[0].end_date, 20240131);
    }

    #[test]
    fn calendar_dates_need_known_type() {
        let t = table(
            TableName::CalendarDates,
            "service_id,date,exception_type\nS1,20240108,2\nS1,20240109,1\nS1,20240110,7\n",
        );
        let out = convert(TableName::CalendarDates, &t, calendar_exception);

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].kind, ExceptionType::Removed);
        assert_eq!(out.items[1].kind, ExceptionType::Added);
        assert_eq!(out.rejected, 1);
    }

    #[test]
    fn shape_points() {
        let t = table(
            TableName::Shapes,
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\nSH1,47.1,18.4,2\nSH1,47.0,18.3,1\nSH1,x,18.3,3\n",
        );
        let out = convert(TableName::Shapes, &t, shape_point);

        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].sequence, 2);
        assert_eq!(out.rejected, 1);
    }
}
