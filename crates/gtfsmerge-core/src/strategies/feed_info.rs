//! `feed_info.txt` (§4.22).
//!
//! No foreign keys, no duplicate-detection policy: every source row is
//! inserted by its `feed_id`, overwriting whatever the target already has
//! under that key. Because the driver processes sources in reverse input
//! order, this "last write wins" rule means the *earliest* input feed's
//! `feed_info.txt` is what survives in the merged output. `feed_id`
//! defaults to `"1"` when the source left it blank (the reader normally
//! fills this in already).
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::policy::StrategyPolicy;

pub fn merge(
    _ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    _policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    for id in source.feed_infos.keys().cloned().collect::<Vec<_>>() {
        let Some(info) = source.feed_infos.get(&id) else {
            continue;
        };
        let key = if id.is_empty() { "1".to_owned() } else { id };
        target.feed_infos.insert(key, info.clone());
    }

    Ok(())
}
