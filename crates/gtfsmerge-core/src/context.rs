//! Per-source scratch state threaded through one source-into-target pass:
//! the assigned prefix, the id-remapping tables each strategy populates for
//! strategies that run after it, and the global shape-sequence counter.
use std::collections::HashMap;

use crate::ids::{AgencyId, AreaId, FareId, PathwayId, RouteId, ServiceId, ShapeId, StopId, TripId};
use crate::policy::DuplicateDetection;

/// `prefix_for_process_index(k)` (§4.3): k=0 -> "a-", ..., k=25 -> "z-",
/// k=26 -> "00-", k=27 -> "01-", ...
pub fn prefix_for_process_index(k: usize) -> String {
    if k < 26 {
        let letter = (b'a' + k as u8) as char;
        format!("{letter}-")
    } else {
        format!("{:02}-", k - 26)
    }
}

/// State scoped to merging one source feed into the growing target. Built
/// fresh per source by the driver and discarded once the source's last
/// strategy finishes.
#[derive(Debug, Default)]
pub struct MergeContext {
    pub prefix: String,
    pub source_index: usize,

    pub agency_ids: HashMap<AgencyId, AgencyId>,
    pub area_ids: HashMap<AreaId, AreaId>,
    pub stop_ids: HashMap<StopId, StopId>,
    pub service_ids: HashMap<ServiceId, ServiceId>,
    pub route_ids: HashMap<RouteId, RouteId>,
    pub shape_ids: HashMap<ShapeId, ShapeId>,
    pub trip_ids: HashMap<TripId, TripId>,
    pub fare_ids: HashMap<FareId, FareId>,
    pub pathway_ids: HashMap<PathwayId, PathwayId>,

    /// Per-file resolved detection mode, populated by auto-detect (§4.20)
    /// before the pass starts when `MergeConfig::auto_detect` is set. Read
    /// by strategies only when their own policy slot was not set
    /// explicitly; in practice the driver pushes the resolved value
    /// straight into each strategy's policy, so this field mainly exists
    /// for inspection/debugging.
    pub resolved_detection: HashMap<crate::policy::GtfsFile, DuplicateDetection>,

    next_shape_sequence: u32,
}

impl MergeContext {
    pub fn new(prefix: String, source_index: usize) -> Self {
        Self {
            prefix,
            source_index,
            ..Self::default()
        }
    }

    /// Returns a fresh, globally unique, monotonically increasing shape
    /// point sequence number (§4.10 / invariant 4 of §3).
    pub fn next_shape_sequence(&mut self) -> u32 {
        let seq = self.next_shape_sequence;
        self.next_shape_sequence += 1;
        seq
    }

    /// How many shape sequence numbers this context has handed out so far.
    /// The driver reads this after each source's pass and seeds the next
    /// source's fresh context with it, so sequence numbers stay unique
    /// across the whole merge rather than resetting per source.
    pub fn shape_sequence_progress(&self) -> u32 {
        self.next_shape_sequence
    }

    /// Seeds the shape sequence counter to continue from a prior context's
    /// progress.
    pub fn seed_shape_sequence(&mut self, start: u32) {
        self.next_shape_sequence = start;
    }
}

/// Computes `new_id` for a colliding id under the `Context` renaming
/// strategy: `prefix + id`.
pub fn renamed(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn prefix_for_process_index_letters() {
        assert_eq!(prefix_for_process_index(0), "a-");
        assert_eq!(prefix_for_process_index(1), "b-");
        assert_eq!(prefix_for_process_index(25), "z-");
    }

    #[test]
    fn prefix_for_process_index_numeric_tier() {
        assert_eq!(prefix_for_process_index(26), "00-");
        assert_eq!(prefix_for_process_index(27), "01-");
        assert_eq!(prefix_for_process_index(36), "10-");
    }

    #[test]
    fn shape_sequence_seed_carries_progress_forward() {
        let mut a = MergeContext::new("a-".to_owned(), 0);
        a.next_shape_sequence();
        a.next_shape_sequence();
        let progress = a.shape_sequence_progress();

        let mut b = MergeContext::new("b-".to_owned(), 1);
        b.seed_shape_sequence(progress);
        assert_eq!(b.next_shape_sequence(), 2);
    }

    #[test]
    fn renamed_prepends_prefix() {
        assert_eq!(renamed("b-", "stop1"), "b-stop1");
    }
}
