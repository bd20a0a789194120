//! `shapes.txt` (§4.10).
//!
//! Legacy-compatible quirks: source shape ids are iterated in lexicographic
//! order, and every emitted point receives a fresh value from
//! [`crate::context::MergeContext::next_shape_sequence`] — input
//! `shape_pt_sequence` values are discarded, only the within-shape point
//! order is preserved. The driver seeds each source's counter from the
//! previous source's progress, so sequences stay unique across the whole
//! merge, not just within one source. The merge design gives no fuzzy
//! formula for shapes, so `Fuzzy` here behaves like `None` (every source
//! shape is treated as its own entity); see `DESIGN.md`.
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::ShapeId;
use crate::policy::StrategyPolicy;

use super::{identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "Shape";

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    let mut ordered_ids: Vec<ShapeId> = source.shapes.keys().cloned().collect();
    ordered_ids.sort();

    for id in ordered_ids {
        let Some(points) = source.shapes.get(&id) else {
            continue;
        };

        if matches!(policy.detection, crate::policy::DuplicateDetection::Identity) && target.shapes.contains_key(&id) {
            identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
            ctx.shape_ids.insert(id.clone(), id);
            continue;
        }

        let new_id = ShapeId::from(resolve_new_id(&ctx.prefix, &id, target.shapes.contains_key(&id)));
        ctx.shape_ids.insert(id, new_id.clone());

        for point in points {
            let mut new_point = point.clone();
            new_point.shape_id = new_id.clone();
            new_point.shape_pt_sequence = ctx.next_shape_sequence();
            target.shapes.push(new_id.clone(), new_point);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::model::ShapePoint;

    fn point(id: &str, lat: f64, lon: f64, seq: u32) -> ShapePoint {
        ShapePoint {
            shape_id: ShapeId::from(id),
            shape_pt_lat: lat,
            shape_pt_lon: lon,
            shape_pt_sequence: seq,
            shape_dist_traveled: None,
        }
    }

    #[test]
    fn sequences_are_globally_unique_and_monotonic() {
        let mut target = Feed::new();
        target.shapes.push(ShapeId::from("existing"), point("existing", 1.0, 1.0, 99));
        let mut source = Feed::new();
        source.shapes.push(ShapeId::from("zeta"), point("zeta", 2.0, 2.0, 5));
        source.shapes.push(ShapeId::from("zeta"), point("zeta", 2.1, 2.1, 6));
        source.shapes.push(ShapeId::from("alpha"), point("alpha", 3.0, 3.0, 1));

        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        // pretend "existing" already consumed sequence 0 in a prior pass.
        ctx.next_shape_sequence();
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");

        // alpha processed before zeta (lexicographic order).
        let alpha = target.shapes.get(&ShapeId::from("alpha")).expect("alpha present");
        let zeta = target.shapes.get(&ShapeId::from("zeta")).expect("zeta present");
        assert_eq!(alpha[0].shape_pt_sequence, 1);
        assert_eq!(zeta[0].shape_pt_sequence, 2);
        assert_eq!(zeta[1].shape_pt_sequence, 3);
    }

    #[test]
    fn within_shape_point_order_is_preserved() {
        let mut target = Feed::new();
        let mut source = Feed::new();
        source.shapes.push(ShapeId::from("s1"), point("s1", 1.0, 1.0, 7));
        source.shapes.push(ShapeId::from("s1"), point("s1", 2.0, 2.0, 3));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        let points = target.shapes.get(&ShapeId::from("s1")).expect("present");
        assert_eq!(points[0].shape_pt_lat, 1.0);
        assert_eq!(points[1].shape_pt_lat, 2.0);
    }
}
