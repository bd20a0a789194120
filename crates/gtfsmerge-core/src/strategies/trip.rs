//! `trips.txt` (§4.11) and the stop-time validation veto (§4.12).
use std::collections::HashSet;

use crate::concurrent_scorer::best_match;
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::{RouteId, ServiceId, ShapeId, TripId};
use crate::model::{StopTime, Trip};
use crate::policy::{DuplicateDetection, StrategyPolicy};
use crate::scoring::{element_overlap, interval_overlap, parse_gtfs_time};

use super::{fuzzy_duplicate_log, identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Trip";
const THRESHOLD: f64 = 0.5;

fn stop_times_for(feed: &Feed, trip_id: &TripId) -> Vec<&StopTime> {
    let mut v: Vec<&StopTime> = feed.stop_times.iter().filter(|st| st.trip_id == *trip_id).collect();
    v.sort_by_key(|st| st.stop_sequence);
    v
}

fn stops_in_common(a: &[&StopTime], b: &[&StopTime]) -> f64 {
    let sa: HashSet<String> = a.iter().map(|st| st.stop_id.0.clone()).collect();
    let sb: HashSet<String> = b.iter().map(|st| st.stop_id.0.clone()).collect();
    element_overlap(&sa, &sb)
}

fn schedule_overlap(a: &[&StopTime], b: &[&StopTime]) -> f64 {
    let (Some(first_a), Some(last_a)) = (a.first(), a.last()) else {
        return 0.0;
    };
    let (Some(first_b), Some(last_b)) = (b.first(), b.last()) else {
        return 0.0;
    };
    interval_overlap(
        parse_gtfs_time(&first_a.departure_time) as f64,
        parse_gtfs_time(&last_a.arrival_time) as f64,
        parse_gtfs_time(&first_b.departure_time) as f64,
        parse_gtfs_time(&last_b.arrival_time) as f64,
    )
}

/// §4.12: even a high-scoring fuzzy match is rejected unless both trips'
/// stop-time sequences agree exactly on stop, arrival, and departure at
/// every position.
fn validate_trip_stop_times(a: &[&StopTime], b: &[&StopTime]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(x, y)| {
        x.stop_id == y.stop_id && x.arrival_time == y.arrival_time && x.departure_time == y.departure_time
    })
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
    min_candidates_for_concurrency: usize,
    use_concurrency: bool,
) -> Result<(), crate::error::MergeError> {
    for id in source.trips.keys().cloned().collect::<Vec<_>>() {
        let Some(trip) = source.trips.get(&id) else {
            continue;
        };
        let remapped_route = ctx.route_ids.get(&trip.route_id).cloned().unwrap_or_else(|| trip.route_id.clone());
        let remapped_service = ctx.service_ids.get(&trip.service_id).cloned().unwrap_or_else(|| trip.service_id.clone());
        let remapped_shape = if trip.shape_id.is_empty() {
            ShapeId::default()
        } else {
            ctx.shape_ids.get(&trip.shape_id).cloned().unwrap_or_else(|| trip.shape_id.clone())
        };

        match policy.detection {
            DuplicateDetection::Identity if target.trips.contains_key(&id) => {
                identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
                ctx.trip_ids.insert(id.clone(), id);
                continue;
            }
            DuplicateDetection::Fuzzy => {
                let source_times = stop_times_for(source, &id);
                let candidates: Vec<&Trip> = target.trips.values().collect();
                let scored = best_match(
                    &candidates,
                    |c| {
                        let route_score = if remapped_route.is_empty() || c.route_id.is_empty() || remapped_route == c.route_id { 1.0 } else { 0.0 };
                        let service_score = if remapped_service.is_empty() || c.service_id.is_empty() || remapped_service == c.service_id { 1.0 } else { 0.0 };
                        let target_times = stop_times_for(target, &c.trip_id);
                        let stops_score = stops_in_common(&source_times, &target_times);
                        let schedule_score = schedule_overlap(&source_times, &target_times);
                        route_score * service_score * stops_score * schedule_score
                    },
                    min_candidates_for_concurrency,
                    use_concurrency,
                );
                if let Some((idx, score)) = scored {
                    if score >= THRESHOLD {
                        let candidate = candidates[idx];
                        let target_times = stop_times_for(target, &candidate.trip_id);
                        if validate_trip_stop_times(&source_times, &target_times) {
                            let target_id = candidate.trip_id.clone();
                            fuzzy_duplicate_log(policy, ENTITY, &id, &target_id, score, ctx.source_index)?;
                            ctx.trip_ids.insert(id, target_id);
                            continue;
                        }
                    }
                }
            }
            DuplicateDetection::None | DuplicateDetection::Identity => {}
        }

        let new_id = TripId::from(resolve_new_id(&ctx.prefix, &id, target.trips.contains_key(&id)));
        ctx.trip_ids.insert(id, new_id.clone());
        let mut new_trip = trip.clone();
        new_trip.trip_id = new_id.clone();
        new_trip.route_id = remapped_route;
        new_trip.service_id = remapped_service;
        new_trip.shape_id = remapped_shape;
        target.trips.insert(new_id, new_trip);
    }

    Ok(())
}
