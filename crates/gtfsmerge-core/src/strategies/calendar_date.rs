//! `calendar_dates.txt` (§4.8).
//!
//! Foreign key: `service_id`, resolved through the `ServiceIdMapping`
//! populated by the Calendar strategy; if a source service has no
//! calendar.txt row at all, a mapping is synthesized here on first sight.
//!
//! The synthesized id's collision check in `resolve_service_id` looks at
//! both `target.calendars` and `target.calendar_dates`, not just the latter
//! — broader than the letter of the merge design, which only names the
//! calendar_dates keyset. `calendar.txt` and `calendar_dates.txt` share the
//! same `service_id` space, so a synthesized id that merely avoided
//! `calendar_dates` collisions could still collide with an existing
//! `calendar.txt` row's service id and silently corrupt it. Deliberate
//! deviation; see `DESIGN.md`'s Open Question entry.
use std::collections::HashSet;

use crate::context::MergeContext;
use crate::feed::Feed;
use crate::ids::ServiceId;
use crate::model::CalendarDate;
use crate::policy::StrategyPolicy;

fn resolve_service_id(ctx: &mut MergeContext, target: &Feed, source_id: &ServiceId) -> ServiceId {
    if let Some(mapped) = ctx.service_ids.get(source_id) {
        return mapped.clone();
    }
    let collides = target.calendars.contains_key(source_id) || target.calendar_dates.contains_key(source_id);
    let new_id = ServiceId::from(super::resolve_new_id(&ctx.prefix, source_id, collides));
    ctx.service_ids.insert(source_id.clone(), new_id.clone());
    new_id
}

pub fn merge(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    _policy: StrategyPolicy,
) -> Result<(), crate::error::MergeError> {
    // Build the dedup set from whatever is already in the target.
    let mut seen: HashSet<(ServiceId, String, u8)> = HashSet::new();
    for (service_id, dates) in target.calendar_dates.iter() {
        for d in dates {
            seen.insert((service_id.clone(), d.date.clone(), d.exception_type));
        }
    }

    for source_service_id in source.calendar_dates.keys().cloned().collect::<Vec<_>>() {
        let Some(dates) = source.calendar_dates.get(&source_service_id) else {
            continue;
        };
        let new_service_id = resolve_service_id(ctx, target, &source_service_id);

        for date in dates {
            let key = (new_service_id.clone(), date.date.clone(), date.exception_type);
            if seen.contains(&key) {
                continue;
            }
            seen.insert(key);
            let mut new_date = date.clone();
            new_date.service_id = new_service_id.clone();
            target.calendar_dates.push(new_service_id.clone(), new_date);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn date(service: &str, d: &str, exception: u8) -> CalendarDate {
        CalendarDate {
            service_id: ServiceId::from(service),
            date: d.to_owned(),
            exception_type: exception,
        }
    }

    #[test]
    fn duplicate_exact_row_is_skipped() {
        let mut target = Feed::new();
        target.calendar_dates.push(ServiceId::from("svc"), date("svc", "20260101", 1));
        let mut source = Feed::new();
        source.calendar_dates.push(ServiceId::from("svc"), date("svc", "20260101", 1));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        ctx.service_ids.insert(ServiceId::from("svc"), ServiceId::from("svc"));
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert_eq!(target.calendar_dates.get(&ServiceId::from("svc")).map(Vec::len), Some(1));
    }

    #[test]
    fn synthesizes_mapping_when_no_calendar_row_exists() {
        let mut target = Feed::new();
        let mut source = Feed::new();
        source.calendar_dates.push(ServiceId::from("svc"), date("svc", "20260101", 1));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert!(target.calendar_dates.contains_key(&ServiceId::from("svc")));
        assert_eq!(ctx.service_ids.get(&ServiceId::from("svc")), Some(&ServiceId::from("svc")));
    }

    #[test]
    fn synthesized_id_avoids_collision_with_calendar_txt_row() {
        use crate::model::Calendar;

        let mut target = Feed::new();
        target.calendars.insert(
            ServiceId::from("svc"),
            Calendar {
                service_id: ServiceId::from("svc"),
                monday: 1,
                tuesday: 1,
                wednesday: 1,
                thursday: 1,
                friday: 1,
                saturday: 0,
                sunday: 0,
                start_date: "20260101".to_owned(),
                end_date: "20261231".to_owned(),
            },
        );
        let mut source = Feed::new();
        source.calendar_dates.push(ServiceId::from("svc"), date("svc", "20260101", 1));
        let mut ctx = MergeContext::new("b-".to_owned(), 0);
        merge(&mut ctx, &source, &mut target, StrategyPolicy::default()).expect("ok");
        assert!(
            target.calendar_dates.contains_key(&ServiceId::from("b-svc")),
            "a service id already used by calendar.txt must not be reused for an unrelated calendar_dates row"
        );
        assert!(!target.calendar_dates.contains_key(&ServiceId::from("svc")));
    }
}
