//! GTFS trip planner server.
//!
//! A web service that answers: "how do I get from this stop to that stop
//! around this time, directly or with one change?"

pub mod domain;
pub mod feed;
pub mod gtfs;
pub mod planner;
pub mod settings;
pub mod web;
