//! Resolution of the services running on a date.
//!
//! A service runs on a date when its weekly calendar says so and no
//! exception removes it, or when an exception adds it. On top of that the
//! feed's day-class service id (workday, Saturday or Sunday) is assumed to
//! run unless that date removes it explicitly.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{ExceptionType, ServiceDate, ServiceId};
use crate::gtfs::GtfsStore;

use super::PlannerConfig;

/// The set of service ids running on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveServices {
    ids: BTreeSet<ServiceId>,
}

impl ActiveServices {
    /// Returns true if the service runs.
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.ids.contains(id)
    }

    /// Returns true if nothing runs.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of running services.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Running service ids, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceId> {
        self.ids.iter()
    }
}

impl FromIterator<ServiceId> for ActiveServices {
    fn from_iter<I: IntoIterator<Item = ServiceId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Compute the services running on `date`.
pub fn active_services(
    store: &GtfsStore,
    config: &PlannerConfig,
    date: ServiceDate,
) -> ActiveServices {
    let weekday = date.weekday();
    let yyyymmdd = date.as_yyyymmdd();

    let mut ids: BTreeSet<ServiceId> = store
        .calendar()
        .iter()
        .filter(|entry| entry.runs_on(weekday) && entry.covers(yyyymmdd))
        .map(|entry| entry.service_id.clone())
        .collect();

    let exceptions = store.exceptions_on(yyyymmdd);
    for exception in exceptions {
        match exception.kind {
            ExceptionType::Added => {
                ids.insert(exception.service_id.clone());
            }
            ExceptionType::Removed => {
                ids.remove(&exception.service_id);
            }
        }
    }

    if let Some(fallback) = config.fallback_service(date.day_class()) {
        let removed = exceptions
            .iter()
            .any(|e| e.kind == ExceptionType::Removed && &e.service_id == fallback);
        if removed {
            debug!(%date, service = %fallback, "fallback service removed for date");
        } else {
            ids.insert(fallback.clone());
        }
    }

    debug!(%date, count = ids.len(), "resolved active services");
    ActiveServices { ids }
}
