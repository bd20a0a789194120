//! `agency.txt` (§4.4).
//!
//! Legacy-compatible quirk: source agency ids are pre-sorted
//! lexicographically before iteration. This is deliberately *not* extended
//! to any other table (§9's open question; see `DESIGN.md`).
//!
//! The merge design gives no fuzzy formula for agencies; `fuzzy_score`
//! below is an invented one — a source agency matches a target agency
//! when either's non-empty name or non-empty URL is identical to the
//! other's (see `DESIGN.md`'s Open Question entry for this and the other
//! unspecified fuzzy formulas).
use crate::concurrent_scorer::best_match;
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::AgencyId;
use crate::model::Agency;
use crate::policy::{DuplicateDetection, StrategyPolicy};

use super::{fuzzy_duplicate_log, identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Agency";
const THRESHOLD: f64 = 0.5;

fn fuzzy_score(a: &Agency, b: &Agency) -> f64 {
    let name_match = !a.agency_name.is_empty() && a.agency_name == b.agency_name;
    let url_match = !a.agency_url.is_empty() && a.agency_url == b.agency_url;
    if name_match || url_match { 1.0 } else { 0.0 }
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
    min_candidates_for_concurrency: usize,
    use_concurrency: bool,
) -> Result<(), crate::error::MergeError> {
    let mut ordered_ids: Vec<AgencyId> = source.agencies.keys().cloned().collect();
    ordered_ids.sort();

    for id in ordered_ids {
        let Some(agency) = source.agencies.get(&id) else {
            continue;
        };

        match policy.detection {
            DuplicateDetection::Identity if target.agencies.contains_key(&id) => {
                identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
                ctx.agency_ids.insert(id.clone(), id);
                continue;
            }
            DuplicateDetection::Fuzzy => {
                let candidates: Vec<&Agency> = target.agencies.values().collect();
                if let Some((idx, score)) =
                    best_match(&candidates, |c| fuzzy_score(agency, c), min_candidates_for_concurrency, use_concurrency)
                {
                    if score >= THRESHOLD {
                        let target_id = candidates[idx].agency_id.clone();
                        fuzzy_duplicate_log(policy, ENTITY, &id, &target_id, score, ctx.source_index)?;
                        ctx.agency_ids.insert(id, target_id);
                        continue;
                    }
                }
            }
            DuplicateDetection::None | DuplicateDetection::Identity => {}
        }

        let new_id = AgencyId::from(resolve_new_id(&ctx.prefix, &id, target.agencies.contains_key(&id)));
        ctx.agency_ids.insert(id, new_id.clone());
        let mut new_agency = agency.clone();
        new_agency.agency_id = new_id.clone();
        target.agencies.insert(new_id, new_agency);
    }

    Ok(())
}
