//! `transfers.txt` (§4.14, invariant 6 of §3).
//!
//! Dedup key: `(from_stop, to_stop, transfer_type, min_transfer_time,
//! from_route, to_route, from_trip, to_trip)`. When `from_stop == to_stop`
//! the route and trip id pairs are normalized to canonical `(min, max)`
//! order before keying, so `{from_route: R1, to_route: R2}` and
//! `{from_route: R2, to_route: R1}` collide for a same-stop transfer.
use std::collections::HashSet;

use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::{RouteId, StopId, TripId};
use crate::model::Transfer;
use crate::policy::StrategyPolicy;

type TransferKey = (String, String, String, String, String, String, String, String);

fn dedup_key(t: &Transfer, from_stop: &StopId, to_stop: &StopId, from_route: &RouteId, to_route: &RouteId, from_trip: &TripId, to_trip: &TripId) -> TransferKey {
    let (route_a, route_b, trip_a, trip_b) = if from_stop == to_stop {
        let (ra, rb) = if from_route.0 <= to_route.0 { (from_route.0.clone(), to_route.0.clone()) } else { (to_route.0.clone(), from_route.0.clone()) };
        let (ta, tb) = if from_trip.0 <= to_trip.0 { (from_trip.0.clone(), to_trip.0.clone()) } else { (to_trip.0.clone(), from_trip.0.clone()) };
        (ra, rb, ta, tb)
    } else {
        (from_route.0.clone(), to_route.0.clone(), from_trip.0.clone(), to_trip.0.clone())
    };
    (
        from_stop.0.clone(),
        to_stop.0.clone(),
        t.transfer_type.clone(),
        t.min_transfer_time.clone(),
        route_a,
        route_b,
        trip_a,
        trip_b,
    )
}

fn remap_transfer(ctx: &MergeContext, t: &Transfer) -> (StopId, StopId, RouteId, RouteId, TripId, TripId) {
    let from_stop = ctx.stop_ids.get(&t.from_stop_id).cloned().unwrap_or_else(|| t.from_stop_id.clone());
    let to_stop = ctx.stop_ids.get(&t.to_stop_id).cloned().unwrap_or_else(|| t.to_stop_id.clone());
    let from_route = ctx.route_ids.get(&t.from_route_id).cloned().unwrap_or_else(|| t.from_route_id.clone());
    let to_route = ctx.route_ids.get(&t.to_route_id).cloned().unwrap_or_else(|| t.to_route_id.clone());
    let from_trip = ctx.trip_ids.get(&t.from_trip_id).cloned().unwrap_or_else(|| t.from_trip_id.clone());
    let to_trip = ctx.trip_ids.get(&t.to_trip_id).cloned().unwrap_or_else(|| t.to_trip_id.clone());
    (from_stop, to_stop, from_route, to_route, from_trip, to_trip)
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    _policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    let mut seen: HashSet<TransferKey> = target
        .transfers
        .iter()
        .map(|t| dedup_key(t, &t.from_stop_id, &t.to_stop_id, &t.from_route_id, &t.to_route_id, &t.from_trip_id, &t.to_trip_id))
        .collect();

    for t in &source.transfers {
        let (from_stop, to_stop, from_route, to_route, from_trip, to_trip) = remap_transfer(ctx, t);
        let key = dedup_key(t, &from_stop, &to_stop, &from_route, &to_route, &from_trip, &to_trip);
        if !seen.insert(key) {
            continue;
        }
        target.transfers.push(Transfer {
            from_stop_id: from_stop,
            to_stop_id: to_stop,
            transfer_type: t.transfer_type.clone(),
            min_transfer_time: t.min_transfer_time.clone(),
            from_route_id: from_route,
            to_route_id: to_route,
            from_trip_id: from_trip,
            to_trip_id: to_trip,
        });
    }

    Ok(())
}
