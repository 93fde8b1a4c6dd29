//! Identifier types for GTFS entities.
//!
//! GTFS identifiers are opaque strings. Wrapping each kind in its own type
//! keeps a stop id from being passed where a trip id is expected.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true for the empty identifier.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// A `stop_id` from `stops.txt`.
    ///
    /// ```
    /// use transit_server::domain::StopId;
    ///
    /// let id = StopId::new("F0123");
    /// assert_eq!(id.as_str(), "F0123");
    /// assert_eq!(format!("{id:?}"), "StopId(F0123)");
    /// ```
    StopId
);

string_id!(
    /// A `route_id` from `routes.txt`.
    RouteId
);

string_id!(
    /// A `trip_id` from `trips.txt`.
    TripId
);

string_id!(
    /// A `service_id` shared by `trips.txt`, `calendar.txt` and `calendar_dates.txt`.
    ServiceId
);

string_id!(
    /// A `shape_id` from `shapes.txt`.
    ShapeId
);
