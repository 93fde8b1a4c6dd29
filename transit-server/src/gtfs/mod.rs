//! GTFS table reading and the in-memory store.
//!
//! Tables are read into [`Table`]s, converted row by row into domain
//! entities and indexed into a [`GtfsStore`].

mod geometry;
mod parse;
mod store;
mod table;

pub use geometry::SegmentPath;
pub use store::{
    FeedTables, GtfsStore, LoadStats, MIN_STOP_QUERY_LEN, TableStats, TripSchedule,
};
pub use table::{Row, Table, TableName};

#[cfg(test)]
pub(crate) use store::test_feed;
