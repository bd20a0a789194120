//! `frequencies.txt` (§4.14). Foreign key: `trip_id`. Deduplicated by the
//! full row (after remapping) since there is no single natural key.
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
    let mut seen: HashSet<(String, String, String, u32, String)> = target
        .frequencies
        .iter()
        .map(|f| (f.trip_id.0.clone(), f.start_time.clone(), f.end_time.clone(), f.headway_secs, f.exact_times.clone()))
        .collect();

    for f in &source.frequencies {
        let new_trip_id = ctx.trip_ids.get(&f.trip_id).cloned().unwrap_or_else(|| f.trip_id.clone());
        let key = (new_trip_id.0.clone(), f.start_time.clone(), f.end_time.clone(), f.headway_secs, f.exact_times.clone());
        if !seen.insert(key) {
            continue;
        }
        let mut new_f = f.clone();
        new_f.trip_id = new_trip_id;
        target.frequencies.push(new_f);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::ids::TripId;
    use crate::model::Frequency;

    fn freq(trip: &str, start: &str, end: &str, headway: u32) -> Frequency {
        Frequency {
            trip_id: TripId::from(trip),
            start_time: start.to_owned(),
            end_time: end.to_owned(),
            headway_secs: headway,
            exact_times: String::new(),
        }
    }

    #[test]
    fn exact_duplicate_row_is_skipped() {
        let mut target = Feed::new();
        target.frequencies.push(freq("t1", "06:00:00", "09:00:00", 600));
        let mut source = Feed::new();
        source.frequencies.push(freq("t1", "06:00:00", "09:00:00", 600));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.trip_ids.insert(TripId::from("t1"), TripId::from("t1"));
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert_eq!(target.frequencies.len(), 1);
    }

    #[test]
    fn different_headway_is_kept() {
        let mut target = Feed::new();
        target.frequencies.push(freq("t1", "06:00:00", "09:00:00", 600));
        let mut source = Feed::new();
        source.frequencies.push(freq("t1", "06:00:00", "09:00:00", 300));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.trip_ids.insert(TripId::from("t1"), TripId::from("t1"));
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert_eq!(target.frequencies.len(), 2);
    }

    #[test]
    fn different_exact_times_is_kept() {
        let mut target = Feed::new();
        let mut target_row = freq("t1", "06:00:00", "09:00:00", 600);
        target_row.exact_times = "0".to_owned();
        target.frequencies.push(target_row);
        let mut source = Feed::new();
        let mut source_row = freq("t1", "06:00:00", "09:00:00", 600);
        source_row.exact_times = "1".to_owned();
        source.frequencies.push(source_row);
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.trip_ids.insert(TripId::from("t1"), TripId::from("t1"));
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert_eq!(target.frequencies.len(), 2, "rows identical except exact_times must not be deduped");
    }
}
