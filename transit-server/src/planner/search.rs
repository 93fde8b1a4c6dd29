//! Trip planning queries.
//!
//! A query resolves the services running on the requested date, runs the
//! direct and one-change searches over them, and ranks the combined result.

use tracing::{debug, info};

use crate::domain::{Itinerary, ServiceDate, ServiceTime, StopId};
use crate::gtfs::GtfsStore;

use super::calendar::active_services;
use super::config::PlannerConfig;
use super::direct::find_direct;
use super::rank::rank_itineraries;
use super::transfer::find_transfers;

/// Error from trip planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A requested stop isn't in the feed
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),

    /// Invalid planning request
    #[error("invalid plan request: {0}")]
    InvalidRequest(String),
}

/// How the reference time constrains results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Leave the origin at or after the reference time
    #[default]
    DepartAfter,
    /// Reach the destination at or before the reference time
    ArriveBy,
}

impl QueryMode {
    /// Returns true if an itinerary with these end times satisfies the mode.
    pub fn admits(
        &self,
        departure: ServiceTime,
        arrival: ServiceTime,
        reference: ServiceTime,
    ) -> bool {
        match self {
            QueryMode::DepartAfter => departure >= reference,
            QueryMode::ArriveBy => arrival <= reference,
        }
    }
}

/// Request for trip planning.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Where the trip starts.
    pub origin: StopId,

    /// Where the trip ends.
    pub destination: StopId,

    /// Service date to plan on.
    pub date: ServiceDate,

    /// The reference time on that date.
    pub time: ServiceTime,

    /// Whether `time` is a departure or an arrival constraint.
    pub mode: QueryMode,
}

impl PlanRequest {
    /// Create a new plan request.
    pub fn new(
        origin: impl Into<StopId>,
        destination: impl Into<StopId>,
        date: ServiceDate,
        time: ServiceTime,
        mode: QueryMode,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
            time,
            mode,
        }
    }

    /// Validate the request against a store.
    pub fn validate(&self, store: &GtfsStore) -> Result<(), PlanError> {
        for stop in [&self.origin, &self.destination] {
            if store.stop(stop.as_str()).is_none() {
                return Err(PlanError::UnknownStop(stop.clone()));
            }
        }

        if self.origin == self.destination {
            return Err(PlanError::InvalidRequest(
                "origin and destination are the same stop".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of trip planning.
#[derive(Debug, Clone)]
pub enum PlanOutcome<'a> {
    /// Ranked itineraries, best first. Never empty.
    Itineraries(Vec<Itinerary<'a>>),

    /// No service runs on the requested date, so nothing was searched.
    NoServiceForDate,

    /// Services run, but none connects the stops at the requested time.
    NoItineraryFound,
}

impl<'a> PlanOutcome<'a> {
    /// The found itineraries; empty for either no-result outcome.
    pub fn itineraries(&self) -> &[Itinerary<'a>] {
        match self {
            PlanOutcome::Itineraries(found) => found,
            PlanOutcome::NoServiceForDate | PlanOutcome::NoItineraryFound => &[],
        }
    }

    /// Consume the outcome, returning the itineraries.
    pub fn into_itineraries(self) -> Vec<Itinerary<'a>> {
        match self {
            PlanOutcome::Itineraries(found) => found,
            PlanOutcome::NoServiceForDate | PlanOutcome::NoItineraryFound => Vec::new(),
        }
    }
}

/// Trip planner over one feed snapshot.
pub struct Planner<'a> {
    store: &'a GtfsStore,
    config: &'a PlannerConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(store: &'a GtfsStore, config: &'a PlannerConfig) -> Self {
        Self { store, config }
    }

    /// Plan direct and one-change trips for a request.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanOutcome<'a>, PlanError> {
        request.validate(self.store)?;

        let active = active_services(self.store, self.config, request.date);
        if active.is_empty() {
            info!(date = %request.date, "no service on date");
            return Ok(PlanOutcome::NoServiceForDate);
        }

        let direct = find_direct(
            self.store,
            &active,
            &request.origin,
            &request.destination,
            request.mode,
            request.time,
        );
        let transfers = find_transfers(
            self.store,
            &active,
            self.config,
            &request.origin,
            &request.destination,
            request.mode,
            request.time,
        );
        debug!(
            direct = direct.len(),
            transfers = transfers.len(),
            "searches finished"
        );

        let ranked = rank_itineraries(direct, transfers, request.mode, self.config.max_results);
        info!(
            origin = %request.origin,
            destination = %request.destination,
            date = %request.date,
            time = %request.time,
            found = ranked.len(),
            "planned trip"
        );

        if ranked.is_empty() {
            Ok(PlanOutcome::NoItineraryFound)
        } else {
            Ok(PlanOutcome::Itineraries(ranked))
        }
    }
}
