//! `areas.txt` (§4.5). No foreign keys. The merge design leaves Area's
//! fuzzy formula unspecified; this implementation scores on exact,
//! non-empty `area_name` equality — an invented formula, not derived from
//! Agency's (which also matches on URL) or FeedInfo's (which has no fuzzy
//! concept at all; it dedupes unconditionally by key). See `DESIGN.md`'s
//! Open Question entry for this and the other unspecified fuzzy formulas.
use crate::concurrent_scorer::best_match;
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::AreaId;
use crate::model::Area;
use crate::policy::{DuplicateDetection, StrategyPolicy};

use super::{fuzzy_duplicate_log, identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Area";
const THRESHOLD: f64 = 0.5;

fn fuzzy_score(a: &Area, b: &Area) -> f64 {
    if !a.area_name.is_empty() && a.area_name == b.area_name {
        1.0
    } else {
        0.0
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
    for id in source.areas.keys().cloned().collect::<Vec<_>>() {
        let Some(area) = source.areas.get(&id) else {
            continue;
        };

        match policy.detection {
            DuplicateDetection::Identity if target.areas.contains_key(&id) => {
                identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
                ctx.area_ids.insert(id.clone(), id);
                continue;
            }
            DuplicateDetection::Fuzzy => {
                let candidates: Vec<&Area> = target.areas.values().collect();
                if let Some((idx, score)) =
                    best_match(&candidates, |c| fuzzy_score(area, c), min_candidates_for_concurrency, use_concurrency)
                {
                    if score >= THRESHOLD {
                        let target_id = candidates[idx].area_id.clone();
                        fuzzy_duplicate_log(policy, ENTITY, &id, &target_id, score, ctx.source_index)?;
                        ctx.area_ids.insert(id, target_id);
                        continue;
                    }
                }
            }
            DuplicateDetection::None | DuplicateDetection::Identity => {}
        }

        let new_id = AreaId::from(resolve_new_id(&ctx.prefix, &id, target.areas.contains_key(&id)));
        ctx.area_ids.insert(id, new_id.clone());
        let mut new_area = area.clone();
        new_area.area_id = new_id.clone();
        target.areas.insert(new_id, new_area);
    }

    Ok(())
}
