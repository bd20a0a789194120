//! `routes.txt` (§4.9).
//!
//! Foreign key: `agency_id`, remapped via the Agency strategy's mapping.
//! The `stops_in_common_score` sub-score needs the stop set each route's
//! trips serve; for the source side that is read straight from the
//! source feed's own (not-yet-merged) trips/stop_times, and for target
//! candidates from the target feed, which by dependency order already
//! holds every trip merged from earlier-processed source feeds.
use std::collections::HashSet;

use crate::concurrent_scorer::best_match;
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::{AgencyId, RouteId};
use crate::model::Route;
use crate::policy::{DuplicateDetection, StrategyPolicy};
use crate::scoring::element_overlap;

use super::{fuzzy_duplicate_log, identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Route";
const THRESHOLD: f64 = 0.5;

fn stops_for_route(feed: &Feed, route_id: &RouteId) -> HashSet<String> {
    let trip_ids: HashSet<String> = feed
        .trips
        .values()
        .filter(|t| t.route_id == *route_id)
        .map(|t| t.trip_id.0.clone())
        .collect();
    feed.stop_times
        .iter()
        .filter(|st| trip_ids.contains(&st.trip_id.0))
        .map(|st| st.stop_id.0.clone())
        .collect()
}

fn name_score(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() || a == b {
        1.0
    } else {
        0.0
    }
}

fn fuzzy_score(
    source: &Route,
    source_stops: &HashSet<String>,
    remapped_agency: &AgencyId,
    target: &Route,
    target_stops: &HashSet<String>,
) -> f64 {
    let agency_score = if remapped_agency.is_empty() || target.agency_id.is_empty() || *remapped_agency == target.agency_id {
        1.0
    } else {
        0.0
    };
    let short_score = name_score(&source.route_short_name, &target.route_short_name);
    let long_score = name_score(&source.route_long_name, &target.route_long_name);
    let stops_score = element_overlap(source_stops, target_stops);
    agency_score * short_score * long_score * stops_score
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
    min_candidates_for_concurrency: usize,
    use_concurrency: bool,
) -> Result<(), crate::error::MergeError> {
    for id in source.routes.keys().cloned().collect::<Vec<_>>() {
        let Some(route) = source.routes.get(&id) else {
            continue;
        };
        let remapped_agency = ctx.agency_ids.get(&route.agency_id).cloned().unwrap_or_else(|| route.agency_id.clone());

        match policy.detection {
            DuplicateDetection::Identity if target.routes.contains_key(&id) => {
                identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
                ctx.route_ids.insert(id.clone(), id);
                continue;
            }
            DuplicateDetection::Fuzzy => {
                let source_stops = stops_for_route(source, &id);
                let candidates: Vec<&Route> = target.routes.values().collect();
                if let Some((idx, score)) = best_match(
                    &candidates,
                    |c| {
                        let target_stops = stops_for_route(target, &c.route_id);
                        fuzzy_score(route, &source_stops, &remapped_agency, c, &target_stops)
                    },
                    min_candidates_for_concurrency,
                    use_concurrency,
                ) {
                    if score >= THRESHOLD {
                        let target_id = candidates[idx].route_id.clone();
                        fuzzy_duplicate_log(policy, ENTITY, &id, &target_id, score, ctx.source_index)?;
                        ctx.route_ids.insert(id, target_id);
                        continue;
                    }
                }
            }
            DuplicateDetection::None | DuplicateDetection::Identity => {}
        }

        let new_id = RouteId::from(resolve_new_id(&ctx.prefix, &id, target.routes.contains_key(&id)));
        ctx.route_ids.insert(id, new_id.clone());
        let mut new_route = route.clone();
        new_route.route_id = new_id.clone();
        new_route.agency_id = remapped_agency;
        target.routes.insert(new_id, new_route);
    }

    Ok(())
}
