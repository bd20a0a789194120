//! GTFS entity types.
//!
//! Field sets follow the GTFS reference (<https://gtfs.org/documentation/schedule/reference/>)
//! trimmed to what the merge engine reads or rewrites; optional descriptive
//! columns not touched by any strategy are carried in `extra` so a
//! round-trip through the writer reproduces them unchanged.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AgencyId, AreaId, FareId, PathwayId, RouteId, ServiceId, ShapeId, StopId, TripId};

/// `agency.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub agency_id: AgencyId,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `areas.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub area_id: AreaId,
    #[serde(default)]
    pub area_name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `stops.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: StopId,
    #[serde(default)]
    pub stop_name: String,
    #[serde(default)]
    pub stop_lat: f64,
    #[serde(default)]
    pub stop_lon: f64,
    #[serde(default)]
    pub location_type: String,
    #[serde(default)]
    pub parent_station: StopId,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `routes.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteId,
    #[serde(default)]
    pub agency_id: AgencyId,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    pub route_type: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `trips.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    #[serde(default)]
    pub shape_id: ShapeId,
    #[serde(default)]
    pub trip_headsign: String,
    #[serde(default)]
    pub direction_id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `stop_times.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StopTime {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub stop_sequence: u32,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `calendar.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub service_id: ServiceId,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    pub start_date: String,
    pub end_date: String,
}

/// `calendar_dates.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub service_id: ServiceId,
    pub date: String,
    pub exception_type: u8,
}

/// A single row of `shapes.txt`. `shape_pt_sequence` is overwritten by the
/// merge engine with a globally unique value; the field here holds whatever
/// value the reader parsed from a source feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapePoint {
    pub shape_id: ShapeId,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
    #[serde(default)]
    pub shape_dist_traveled: Option<f64>,
}

/// `frequencies.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub trip_id: TripId,
    pub start_time: String,
    pub end_time: String,
    pub headway_secs: u32,
    #[serde(default)]
    pub exact_times: String,
}

/// `transfers.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub from_stop_id: StopId,
    #[serde(default)]
    pub to_stop_id: StopId,
    pub transfer_type: String,
    #[serde(default)]
    pub min_transfer_time: String,
    #[serde(default)]
    pub from_route_id: RouteId,
    #[serde(default)]
    pub to_route_id: RouteId,
    #[serde(default)]
    pub from_trip_id: TripId,
    #[serde(default)]
    pub to_trip_id: TripId,
}

/// `fare_attributes.txt`. `agency_id` is intentionally carried over verbatim
/// by the merge engine (§4.15 of the merge design) rather than remapped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FareAttribute {
    pub fare_id: FareId,
    pub price: String,
    pub currency_type: String,
    pub payment_method: String,
    pub transfers: String,
    #[serde(default)]
    pub agency_id: AgencyId,
    #[serde(default)]
    pub transfer_duration: String,
}

/// `fare_rules.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FareRule {
    pub fare_id: FareId,
    #[serde(default)]
    pub route_id: RouteId,
    #[serde(default)]
    pub origin_id: String,
    #[serde(default)]
    pub destination_id: String,
    #[serde(default)]
    pub contains_id: String,
}

/// `pathways.txt`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pathway {
    pub pathway_id: PathwayId,
    pub from_stop_id: StopId,
    pub to_stop_id: StopId,
    pub pathway_mode: String,
    pub is_bidirectional: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// `feed_info.txt`. `feed_id` is synthesized as `"1"` by the reader when the
/// source file omits the column, so the merge engine always has a key to
/// dedupe on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedInfo {
    #[serde(default)]
    pub feed_id: String,
    pub feed_publisher_name: String,
    pub feed_publisher_url: String,
    pub feed_lang: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn stop_default_has_empty_parent() {
        let s = Stop::default();
        assert!(s.parent_station.is_empty());
    }

    #[test]
    fn agency_extra_round_trips_unknown_columns() {
        let mut extra = BTreeMap::new();
        extra.insert("agency_phone".to_owned(), "555-0100".to_owned());
        let a = Agency {
            agency_id: AgencyId::from("a1"),
            agency_name: "Acme Transit".to_owned(),
            agency_url: "https://example.org".to_owned(),
            agency_timezone: "America/Los_Angeles".to_owned(),
            extra,
        };
        let json = serde_json::to_string(&a).expect("serialize");
        let back: Agency = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.extra.get("agency_phone").map(String::as_str), Some("555-0100"));
    }
}
