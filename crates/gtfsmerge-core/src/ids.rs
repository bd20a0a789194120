//! Opaque identifier newtypes for the GTFS data model.
//!
//! GTFS ids are free-form strings — unlike OMTSF's node/edge ids there is no
//! fixed format to validate against, so these wrappers exist purely to keep
//! `StopId` and `TripId` from being swapped at a call site, not to reject
//! malformed input. An empty string is a valid value and means "not set."
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

macro_rules! gtfs_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Returns `true` when the id is the empty string, i.e. unset.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

gtfs_id!(AgencyId, "Primary key of `agency.txt`.");
gtfs_id!(StopId, "Primary key of `stops.txt`.");
gtfs_id!(RouteId, "Primary key of `routes.txt`.");
gtfs_id!(TripId, "Primary key of `trips.txt`.");
gtfs_id!(ServiceId, "Shared key of `calendar.txt` and `calendar_dates.txt`.");
gtfs_id!(ShapeId, "Grouping key of rows in `shapes.txt`.");
gtfs_id!(FareId, "Primary key of `fare_attributes.txt`.");
gtfs_id!(AreaId, "Primary key of `areas.txt`.");
gtfs_id!(PathwayId, "Primary key of `pathways.txt`.");

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn empty_id_is_empty() {
        assert!(StopId::default().is_empty());
        assert!(StopId::from("").is_empty());
        assert!(!StopId::from("s1").is_empty());
    }

    #[test]
    fn deref_gives_str_access() {
        let id = RouteId::from("r1");
        assert_eq!(id.len(), 2);
        assert!(id.starts_with('r'));
    }

    #[test]
    fn display_matches_inner_string() {
        let id = TripId::from("trip-7");
        assert_eq!(format!("{id}"), "trip-7");
    }

    #[test]
    fn ids_are_ordered_lexicographically() {
        let mut ids = vec![AgencyId::from("b1"), AgencyId::from("a1"), AgencyId::from("c1")];
        ids.sort();
        assert_eq!(ids, vec![AgencyId::from("a1"), AgencyId::from("b1"), AgencyId::from("c1")]);
    }
}
