//! `stop_times.txt` (§4.13).
//!
//! Foreign keys: `trip_id`, `stop_id`. Deduplication key when
//! `detection = Identity` is `(trip_id, stop_sequence)` after remapping;
//! the dedup set starts from the target's existing rows and grows as new
//! rows are appended, so duplicates within a single source are also
//! suppressed.
use std::collections::HashSet;

use crate::context::MergeContext;
use crate::feed::Feed;
use crate::policy::{DuplicateDetection, StrategyPolicy};

use super::identity_duplicate_log;

const ENTITY: &str = "StopTime";

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    let mut seen: HashSet<(String, u32)> = target
        .stop_times
        .iter()
        .map(|st| (st.trip_id.0.clone(), st.stop_sequence))
        .collect();

    for st in &source.stop_times {
        let new_trip_id = ctx.trip_ids.get(&st.trip_id).cloned().unwrap_or_else(|| st.trip_id.clone());
        let new_stop_id = ctx.stop_ids.get(&st.stop_id).cloned().unwrap_or_else(|| st.stop_id.clone());

        let key = (new_trip_id.0.clone(), st.stop_sequence);
        if matches!(policy.detection, DuplicateDetection::Identity) && seen.contains(&key) {
            identity_duplicate_log(policy, ENTITY, &format!("{}@{}", new_trip_id, st.stop_sequence), ctx.source_index)?;
            continue;
        }
        seen.insert(key);

        let mut new_st = st.clone();
        new_st.trip_id = new_trip_id;
        new_st.stop_id = new_stop_id;
        target.stop_times.push(new_st);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::ids::{StopId, TripId};
    use crate::model::StopTime;

    fn st(trip: &str, stop: &str, seq: u32) -> StopTime {
        StopTime {
            trip_id: TripId::from(trip),
            stop_id: StopId::from(stop),
            stop_sequence: seq,
            arrival_time: "08:00:00".to_owned(),
            departure_time: "08:00:00".to_owned(),
            extra: Default::default(),
        }
    }

    #[test]
    fn identity_dedup_drops_exact_position_collision() {
        let mut target = Feed::new();
        target.stop_times.push(st("t1", "a", 1));
        let mut source = Feed::new();
        source.stop_times.push(st("t1", "a", 1));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.trip_ids.insert(TripId::from("t1"), TripId::from("t1"));
        let policy = StrategyPolicy::new(DuplicateDetection::Identity, Default::default());
        merge(&mut ctx, &source, &mut target, policy).expect("ok");
        assert_eq!(target.stop_times.len(), 1);
    }

    #[test]
    fn remaps_trip_and_stop_ids() {
        let mut target = Feed::new();
        let mut source = Feed::new();
        source.stop_times.push(st("t1", "a", 1));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.trip_ids.insert(TripId::from("t1"), TripId::from("b-t1"));
        ctx.stop_ids.insert(StopId::from("a"), StopId::from("b-a"));
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert_eq!(target.stop_times[0].trip_id, TripId::from("b-t1"));
        assert_eq!(target.stop_times[0].stop_id, StopId::from("b-a"));
    }
}
