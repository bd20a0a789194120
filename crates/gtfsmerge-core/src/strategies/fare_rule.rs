//! `fare_rules.txt` (§4.14). No natural key; deduplicated by the full row
//! (after `fare_id`/`route_id` remapping).
use std::collections::HashSet;

use crate::context::MergeContext;
use crate::feed::Feed;
use crate::policy::StrategyPolicy;

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    _policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    let mut seen: HashSet<(String, String, String, String, String)> = target
        .fare_rules
        .iter()
        .map(|r| (r.fare_id.0.clone(), r.route_id.0.clone(), r.origin_id.clone(), r.destination_id.clone(), r.contains_id.clone()))
        .collect();

    for r in &source.fare_rules {
        let new_fare_id = ctx.fare_ids.get(&r.fare_id).cloned().unwrap_or_else(|| r.fare_id.clone());
        let new_route_id = ctx.route_ids.get(&r.route_id).cloned().unwrap_or_else(|| r.route_id.clone());
        let key = (new_fare_id.0.clone(), new_route_id.0.clone(), r.origin_id.clone(), r.destination_id.clone(), r.contains_id.clone());
        if !seen.insert(key) {
            continue;
        }
        let mut new_rule = r.clone();
        new_rule.fare_id = new_fare_id;
        new_rule.route_id = new_route_id;
        target.fare_rules.push(new_rule);
    }

    Ok(())
}
