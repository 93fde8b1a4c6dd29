//! Trip planner over a GTFS store.
//!
//! This module answers: "which trips take me from this stop to that stop
//! around this time, directly or with one change?"
//!
//! A query first resolves the services running on the date, then searches
//! direct trips and two-trip combinations joined at a shared stop, and
//! finally ranks them by departure or arrival time.

mod calendar;
mod config;
mod direct;
mod rank;
mod search;
mod transfer;


pub use calendar::{ActiveServices, active_services};
pub use config::PlannerConfig;
pub use direct::find_direct;
pub use rank::rank_itineraries;
pub use search::{PlanError, PlanOutcome, PlanRequest, Planner, QueryMode};
pub use transfer::find_transfers;
