//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from feed loading and API errors.

use super::{ServiceTime, StopId, TimeError};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A stop time needed for a segment could not be parsed
    #[error(transparent)]
    Time(#[from] TimeError),

    /// Invalid segment construction (e.g., alight before board)
    #[error("invalid segment: {0}")]
    InvalidSegment(&'static str),

    /// Arrival is earlier than departure
    #[error("negative duration: departs {departure}, arrives {arrival}")]
    NegativeDuration {
        departure: ServiceTime,
        arrival: ServiceTime,
    },

    /// Consecutive segments don't share the interchange stop
    #[error("segments do not connect: {0} and {1}")]
    StopsNotConnected(StopId, StopId),
}
