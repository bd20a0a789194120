//! `fare_attributes.txt` (§4.15).
//!
//! Legacy-compatible quirk: `agency_id` is carried over verbatim and is
//! *not* remapped through the Agency strategy's mapping.
use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::FareId;
use crate::policy::{DuplicateDetection, StrategyPolicy};

use super::{identity_duplicate_log, resolve_new_id};

const ENTITY: &str = "FareAttribute";

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    for id in source.fare_attributes.keys().cloned().collect::<Vec<_>>() {
        let Some(fare) = source.fare_attributes.get(&id) else {
            continue;
        };

        if matches!(policy.detection, DuplicateDetection::Identity) && target.fare_attributes.contains_key(&id) {
            identity_duplicate_log(policy, ENTITY, &id, ctx.source_index)?;
            ctx.fare_ids.insert(id.clone(), id);
            continue;
        }

        let new_id = FareId::from(resolve_new_id(&ctx.prefix, &id, target.fare_attributes.contains_key(&id)));
        ctx.fare_ids.insert(id, new_id.clone());
        let mut new_fare = fare.clone();
        new_fare.fare_id = new_id.clone();
        // agency_id intentionally left untouched.
        target.fare_attributes.insert(new_id, new_fare);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::ids::AgencyId;
    use crate::model::FareAttribute;

    fn fare(id: &str, agency: &str) -> FareAttribute {
        FareAttribute {
            fare_id: FareId::from(id),
            price: "2.50".to_owned(),
            currency_type: "USD".to_owned(),
            payment_method: "0".to_owned(),
            transfers: "0".to_owned(),
            agency_id: AgencyId::from(agency),
            transfer_duration: String::new(),
        }
    }

    #[test]
    fn agency_id_is_not_remapped() {
        let mut target = Feed::new();
        let mut source = Feed::new();
        source.fare_attributes.insert(FareId::from("f1"), fare("f1", "a1"));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.agency_ids.insert(AgencyId::from("a1"), AgencyId::from("b-a1"));
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        let out = target.fare_attributes.get(&FareId::from("f1")).expect("present");
        assert_eq!(out.agency_id, AgencyId::from("a1"), "fare agency_id must be carried over verbatim");
    }
}
