//! `stops.txt` (§4.6).
//!
//! `parent_station` is a self-referential foreign key, including forward
//! references within the same source feed. It is resolved without a
//! second pass: whichever final id a referenced stop ends up with (plain
//! or prefixed) is exactly the id this same resolution rule produces for
//! any other reference to it, so order of processing does not matter
//! (§9's cyclic-reference note).
use crate::concurrent_scorer::best_match;
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::StopId;
use crate::model::Stop;
use crate::policy::{DuplicateDetection, StrategyPolicy};
use crate::scoring::haversine_m;

use super::{fuzzy_duplicate_log, identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Stop";
const THRESHOLD: f64 = 0.5;

fn distance_score(a: &Stop, b: &Stop) -> f64 {
    let meters = haversine_m(a.stop_lat, a.stop_lon, b.stop_lat, b.stop_lon);
    if meters < 50.0 {
        1.0
    } else if meters < 100.0 {
        0.75
    } else if meters < 500.0 {
        0.5
    } else {
        0.0
    }
}

fn fuzzy_score(a: &Stop, b: &Stop) -> f64 {
    let name_score = if a.stop_name == b.stop_name { 1.0 } else { 0.0 };
    name_score * distance_score(a, b)
}

/// Resolves a `parent_station` reference through the id mapping built so
/// far this pass, falling back to the collision rule when the parent has
/// not been assigned a mapping yet.
fn resolve_parent(ctx: &MergeContext, target: &Feed, parent: &StopId) -> StopId {
    if parent.is_empty() {
        return parent.clone();
    }
    if let Some(mapped) = ctx.stop_ids.get(parent) {
        return mapped.clone();
    }
    if target.stops.contains_key(parent) {
        StopId::from(crate::context::renamed(&ctx.prefix, parent))
    } else {
        parent.clone()
    }
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
    min_candidates_for_concurrency: usize,
    use_concurrency: bool,
) -> Result<(), crate::error::MergeError> {
    for id in source.stops.keys().cloned().collect::<Vec<_>>() {
        let Some(stop) = source.stops.get(&id) else {
            continue;
        };

        match policy.detection {
            DuplicateDetection::Identity if target.stops.contains_key(&id) => {
                identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
                ctx.stop_ids.insert(id.clone(), id);
                continue;
            }
            DuplicateDetection::Fuzzy => {
                let candidates: Vec<&Stop> = target.stops.values().collect();
                if let Some((idx, score)) =
                    best_match(&candidates, |c| fuzzy_score(stop, c), min_candidates_for_concurrency, use_concurrency)
                {
                    if score >= THRESHOLD {
                        let target_id = candidates[idx].stop_id.clone();
                        fuzzy_duplicate_log(policy, ENTITY, &id, &target_id, score, ctx.source_index)?;
                        ctx.stop_ids.insert(id, target_id);
                        continue;
                    }
                }
            }
            DuplicateDetection::None | DuplicateDetection::Identity => {}
        }

        let new_id = StopId::from(resolve_new_id(&ctx.prefix, &id, target.stops.contains_key(&id)));
        ctx.stop_ids.insert(id, new_id.clone());
        let mut new_stop = stop.clone();
        new_stop.stop_id = new_id.clone();
        new_stop.parent_station = resolve_parent(ctx, target, &stop.parent_station);
        target.stops.insert(new_id, new_stop);
    }

    Ok(())
}
