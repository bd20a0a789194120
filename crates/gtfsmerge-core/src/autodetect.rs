//! Auto-detection of a duplicate-detection mode from overall similarity
//! between a source and target feed (§4.20).
use std::collections::HashSet;

use crate::feed::Feed;
use crate::policy::{AutoDetectThresholds, DuplicateDetection};
use crate::scoring::{element_overlap, haversine_m};

/// Chooses a [`DuplicateDetection`] mode for merging `source` into
/// `target`. Runs once per source; the driver then pushes the result into
/// every strategy's policy slot that was not configured explicitly.
pub fn detect(source: &Feed, target: &Feed, thresholds: AutoDetectThresholds) -> DuplicateDetection {
    if source.is_empty_feed() || target.is_empty_feed() {
        return DuplicateDetection::None;
    }

    let id_overlap = max_id_overlap(source, target);
    if id_overlap >= thresholds.identity_overlap_threshold {
        return DuplicateDetection::Identity;
    }

    let fuzzy_similarity = average_fuzzy_similarity(source, target);
    if fuzzy_similarity >= thresholds.fuzzy_similarity_threshold {
        return DuplicateDetection::Fuzzy;
    }

    DuplicateDetection::None
}

fn max_id_overlap(source: &Feed, target: &Feed) -> f64 {
    let agency = element_overlap(&id_set_agency(source), &id_set_agency(target));
    let stop = element_overlap(&id_set_stop(source), &id_set_stop(target));
    let route = element_overlap(&id_set_route(source), &id_set_route(target));
    let trip = element_overlap(&id_set_trip(source), &id_set_trip(target));
    let service = element_overlap(&id_set_service(source), &id_set_service(target));
    [agency, stop, route, trip, service]
        .into_iter()
        .fold(0.0_f64, f64::max)
}

fn id_set_agency(f: &Feed) -> HashSet<String> {
    f.agencies.keys().map(|k| k.0.clone()).collect()
}
fn id_set_stop(f: &Feed) -> HashSet<String> {
    f.stops.keys().map(|k| k.0.clone()).collect()
}
fn id_set_route(f: &Feed) -> HashSet<String> {
    f.routes.keys().map(|k| k.0.clone()).collect()
}
fn id_set_trip(f: &Feed) -> HashSet<String> {
    f.trips.keys().map(|k| k.0.clone()).collect()
}
fn id_set_service(f: &Feed) -> HashSet<String> {
    f.calendars.keys().map(|k| k.0.clone()).collect()
}

/// Average of three fuzzy signals: agency name/url match fraction, stop
/// name+proximity match fraction, route short/long-name match fraction.
fn average_fuzzy_similarity(source: &Feed, target: &Feed) -> f64 {
    let agency = best_fraction(source.agencies.values().count(), || {
        source
            .agencies
            .values()
            .filter(|a| {
                target.agencies.values().any(|t| {
                    (!a.agency_name.is_empty() && a.agency_name == t.agency_name)
                        || (!a.agency_url.is_empty() && a.agency_url == t.agency_url)
                })
            })
            .count()
    });

    let stop = best_fraction(source.stops.values().count(), || {
        source
            .stops
            .values()
            .filter(|s| {
                target.stops.values().any(|t| {
                    !s.stop_name.is_empty()
                        && s.stop_name == t.stop_name
                        && haversine_m(s.stop_lat, s.stop_lon, t.stop_lat, t.stop_lon) < 500.0
                })
            })
            .count()
    });

    let route = best_fraction(source.routes.values().count(), || {
        source
            .routes
            .values()
            .filter(|r| {
                target.routes.values().any(|t| {
                    (!r.route_short_name.is_empty() && r.route_short_name == t.route_short_name)
                        || (!r.route_long_name.is_empty() && r.route_long_name == t.route_long_name)
                })
            })
            .count()
    });

    (agency + stop + route) / 3.0
}

fn best_fraction(total: usize, matches: impl FnOnce() -> usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matches() as f64 / total as f64
}
