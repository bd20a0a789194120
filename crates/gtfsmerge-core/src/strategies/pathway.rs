//! `pathways.txt` (§4.14). Keyed by its own `pathway_id`; foreign keys
//! `from_stop_id`/`to_stop_id` are remapped through the Stop strategy's
//! mapping. On id collision with the target the prefix is applied, the
//! same as any other id-keyed table (§4.2).
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::PathwayId;
use crate::policy::{DuplicateDetection, StrategyPolicy};

use super::{identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Pathway";

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    for id in source.pathways.keys().cloned().collect::<Vec<_>>() {
        let Some(pathway) = source.pathways.get(&id) else {
            continue;
        };

        if matches!(policy.detection, DuplicateDetection::Identity) && target.pathways.contains_key(&id) {
            identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
            ctx.pathway_ids.insert(id.clone(), id);
            continue;
        }

        let new_id = PathwayId::from(resolve_new_id(&ctx.prefix, &id, target.pathways.contains_key(&id)));
        ctx.pathway_ids.insert(id, new_id.clone());
        let mut new_pathway = pathway.clone();
        new_pathway.pathway_id = new_id.clone();
        new_pathway.from_stop_id = ctx.stop_ids.get(&pathway.from_stop_id).cloned().unwrap_or_else(|| pathway.from_stop_id.clone());
        new_pathway.to_stop_id = ctx.stop_ids.get(&pathway.to_stop_id).cloned().unwrap_or_else(|| pathway.to_stop_id.clone());
        target.pathways.insert(new_id, new_pathway);
    }

    Ok(())
}
