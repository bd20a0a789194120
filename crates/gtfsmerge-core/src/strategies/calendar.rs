//! `calendar.txt` (§4.7). No foreign keys.
use crate::concurrent_scorer::best_match;
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::ServiceId;
use crate::model::Calendar;
use crate::policy::{DuplicateDetection, StrategyPolicy};
use crate::scoring::interval_overlap;

use super::{fuzzy_duplicate_log, identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Calendar";
const THRESHOLD: f64 = 0.5;

fn date_as_num(date: &str) -> f64 {
    date.parse::<f64>().unwrap_or(0.0)
}

fn fuzzy_score(a: &Calendar, b: &Calendar) -> f64 {
    interval_overlap(
        date_as_num(&a.start_date),
        date_as_num(&a.end_date),
        date_as_num(&b.start_date),
        date_as_num(&b.end_date),
    )
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
    min_candidates_for_concurrency: usize,
    use_concurrency: bool,
) -> Result<(), crate::error::MergeError> {
    for id in source.calendars.keys().cloned().collect::<Vec<_>>() {
        let Some(calendar) = source.calendars.get(&id) else {
            continue;
        };

        match policy.detection {
            DuplicateDetection::Identity if target.calendars.contains_key(&id) => {
                identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
                ctx.service_ids.insert(id.clone(), id);
                continue;
            }
            DuplicateDetection::Fuzzy => {
                let candidates: Vec<&Calendar> = target.calendars.values().collect();
                if let Some((idx, score)) = best_match(
                    &candidates,
                    |c| fuzzy_score(calendar, c),
                    min_candidates_for_concurrency,
                    use_concurrency,
                ) {
                    if score >= THRESHOLD {
                        let target_id = candidates[idx].service_id.clone();
                        fuzzy_duplicate_log(policy, ENTITY, &id, &target_id, score, ctx.source_index)?;
                        ctx.service_ids.insert(id, target_id);
                        continue;
                    }
                }
            }
            DuplicateDetection::None | DuplicateDetection::Identity => {}
        }

        let new_id = ServiceId::from(resolve_new_id(&ctx.prefix, &id, target.calendars.contains_key(&id)));
        ctx.service_ids.insert(id, new_id.clone());
        let mut new_calendar = calendar.clone();
        new_calendar.service_id = new_id.clone();
        target.calendars.insert(new_id, new_calendar);
    }

    Ok(())
}
