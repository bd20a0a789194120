//! The merge driver: reverse-order feed processing, prefix assignment,
//! and dependency-ordered strategy invocation (§4.16).
use crate::autodetect;
use crate::context::{MergeContext, prefix_for_process_index};
use crate::error::MergeError;
use crate::feed::Feed;
use crate::policy::{GtfsFile, MergeConfig};
use crate::strategies;

/// Result of a successful merge: the merged feed. Warnings produced along
/// the way (duplicate detections under a `Warning` logging policy) are
/// emitted through the `log` facade as they occur rather than collected
/// here — see `gtfsmerge-cli`'s logging setup.
#[derive(Debug)]
pub struct MergeOutput {
    pub feed: Feed,
}

/// Merges `feeds` using `config`'s per-file policies. `feeds` must be in
/// the order they were supplied on the command line; the driver itself
/// reverses the processing order (§2) so the first entry in `feeds` ends
/// up with the unprefixed namespace when a collision forces a rename.
pub fn merge(feeds: &[Feed], config: &MergeConfig) -> Result<MergeOutput, MergeError> {
    if feeds.is_empty() {
        return Err(MergeError::NoInputFeeds { count: 0 });
    }

    let mut target = Feed::new();
    let n = feeds.len();
    let mut shape_sequence_progress = 0u32;

    // Reverse order: the feed at input index n-1 is processed first and
    // gets prefix k=0 ("a-"); feed 0 is processed last with k=n-1.
    for i in (0..n).rev() {
        let source = &feeds[i];
        let k = (n - 1) - i;
        let prefix = prefix_for_process_index(k);
        let mut ctx = MergeContext::new(prefix, i);
        ctx.seed_shape_sequence(shape_sequence_progress);

        let resolved = if config.auto_detect {
            Some(autodetect::detect(source, &target, config.auto_detect_thresholds))
        } else {
            None
        };

        run_pass(&mut ctx, source, &mut target, config, resolved)?;
        shape_sequence_progress = ctx.shape_sequence_progress();
    }

    Ok(MergeOutput { feed: target })
}

fn run_pass(
    ctx: &mut MergeContext,
    source: &Feed,
    target: &mut Feed,
    config: &MergeConfig,
    resolved_detection: Option<crate::policy::DuplicateDetection>,
) -> Result<(), MergeError> {
    let effective_policy = |file: GtfsFile| {
        let mut policy = config.policy_for(file);
        if let Some(detection) = resolved_detection {
            policy.detection = detection;
        }
        policy
    };
    let min_candidates = config.concurrent_scorer_min_candidates;
    let use_concurrency = config.concurrent_scorer_enabled;

    strategies::agency::merge(ctx, source, target, effective_policy(GtfsFile::Agency), min_candidates, use_concurrency)
        .map_err(|e| wrap(e, "Agency"))?;
    strategies::area::merge(ctx, source, target, effective_policy(GtfsFile::Area), min_candidates, use_concurrency)
        .map_err(|e| wrap(e, "Area"))?;
    strategies::stop::merge(ctx, source, target, effective_policy(GtfsFile::Stop), min_candidates, use_concurrency)
        .map_err(|e| wrap(e, "Stop"))?;
    strategies::calendar::merge(ctx, source, target, effective_policy(GtfsFile::Calendar), min_candidates, use_concurrency)
        .map_err(|e| wrap(e, "Calendar"))?;
    strategies::calendar_date::merge(ctx, source, target, effective_policy(GtfsFile::CalendarDate))
        .map_err(|e| wrap(e, "CalendarDate"))?;
    strategies::route::merge(ctx, source, target, effective_policy(GtfsFile::Route), min_candidates, use_concurrency)
        .map_err(|e| wrap(e, "Route"))?;
    strategies::shape::merge(ctx, source, target, effective_policy(GtfsFile::Shape))
        .map_err(|e| wrap(e, "Shape"))?;
    strategies::trip::merge(ctx, source, target, effective_policy(GtfsFile::Trip), min_candidates, use_concurrency)
        .map_err(|e| wrap(e, "Trip"))?;
    strategies::stop_time::merge(ctx, source, target, effective_policy(GtfsFile::StopTime))
        .map_err(|e| wrap(e, "StopTime"))?;
    strategies::frequency::merge(ctx, source, target, effective_policy(GtfsFile::Frequency))
        .map_err(|e| wrap(e, "Frequency"))?;
    strategies::transfer::merge(ctx, source, target, effective_policy(GtfsFile::Transfer))
        .map_err(|e| wrap(e, "Transfer"))?;
    strategies::pathway::merge(ctx, source, target, effective_policy(GtfsFile::Pathway))
        .map_err(|e| wrap(e, "Pathway"))?;
    strategies::fare_attribute::merge(ctx, source, target, effective_policy(GtfsFile::FareAttribute))
        .map_err(|e| wrap(e, "FareAttribute"))?;
    strategies::fare_rule::merge(ctx, source, target, effective_policy(GtfsFile::FareRule))
        .map_err(|e| wrap(e, "FareRule"))?;
    strategies::feed_info::merge(ctx, source, target, effective_policy(GtfsFile::FeedInfo))
        .map_err(|e| wrap(e, "FeedInfo"))?;

    target.columns.union_with(&source.columns);

    Ok(())
}

/// Strategy errors already carry their own variant (`DuplicateWithErrorLogging`
/// etc.); only genuinely unexpected internal failures would need wrapping,
/// so this currently passes errors through unchanged. Kept as a named seam
/// so a future strategy that can fail for reasons other than the logging
/// policy has somewhere to attach the entity name.
fn wrap(e: MergeError, _entity: &'static str) -> MergeError {
    e
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::ids::AgencyId;
    use crate::model::Agency;
    use crate::policy::{DuplicateDetection, DuplicateLogging};

    fn agency(id: &str, name: &str) -> Agency {
        Agency {
            agency_id: AgencyId::from(id),
            agency_name: name.to_owned(),
            agency_url: String::new(),
            agency_timezone: "UTC".to_owned(),
            extra: Default::default(),
        }
    }

    #[test]
    fn no_feeds_is_an_error() {
        let result = merge(&[], &MergeConfig::default());
        assert!(matches!(result, Err(MergeError::NoInputFeeds { count: 0 })));
    }

    #[test]
    fn single_feed_merge_is_idempotent() {
        let mut f = Feed::new();
        f.agencies.insert(AgencyId::from("a1"), agency("a1", "Acme"));
        let output = merge(&[f], &MergeConfig::default()).expect("merge ok");
        assert_eq!(output.feed.agencies.len(), 1);
    }

    #[test]
    fn two_feed_collision_prefixes_the_earlier_input() {
        let mut a = Feed::new();
        a.agencies.insert(AgencyId::from("shared"), agency("shared", "From A"));
        let mut b = Feed::new();
        b.agencies.insert(AgencyId::from("shared"), agency("shared", "From B"));

        let output = merge(&[a, b], &MergeConfig::default()).expect("merge ok");
        assert_eq!(output.feed.agencies.len(), 2);
        assert!(output.feed.agencies.contains_key(&AgencyId::from("shared")));
        assert!(output.feed.agencies.contains_key(&AgencyId::from("b-shared")));
        assert_eq!(
            output.feed.agencies.get(&AgencyId::from("shared")).map(|a| a.agency_name.as_str()),
            Some("From B")
        );
    }

    #[test]
    fn three_feed_collision_uses_letter_prefixes_by_reverse_position() {
        let mut a = Feed::new();
        a.agencies.insert(AgencyId::from("shared"), agency("shared", "A"));
        let mut b = Feed::new();
        b.agencies.insert(AgencyId::from("shared"), agency("shared", "B"));
        let mut c = Feed::new();
        c.agencies.insert(AgencyId::from("shared"), agency("shared", "C"));

        let output = merge(&[a, b, c], &MergeConfig::default()).expect("merge ok");
        assert!(output.feed.agencies.contains_key(&AgencyId::from("shared")));
        assert!(output.feed.agencies.contains_key(&AgencyId::from("b-shared")));
        assert!(output.feed.agencies.contains_key(&AgencyId::from("c-shared")));
    }

    #[test]
    fn identity_detection_merges_shared_agency_into_one() {
        let mut a = Feed::new();
        a.agencies.insert(AgencyId::from("a1"), agency("a1", "From A"));
        let mut b = Feed::new();
        b.agencies.insert(AgencyId::from("a1"), agency("a1", "From B"));

        let mut config = MergeConfig::default();
        config.set_all(DuplicateDetection::Identity, DuplicateLogging::None);
        let output = merge(&[a, b], &config).expect("merge ok");
        assert_eq!(output.feed.agencies.len(), 1);
        assert_eq!(
            output.feed.agencies.get(&AgencyId::from("a1")).map(|a| a.agency_name.as_str()),
            Some("From B")
        );
    }

    #[test]
    fn shape_sequences_stay_unique_across_sources() {
        use crate::ids::ShapeId;
        use crate::model::ShapePoint;

        fn point(id: &str, seq: u32) -> ShapePoint {
            ShapePoint {
                shape_id: ShapeId::from(id),
                shape_pt_lat: 1.0,
                shape_pt_lon: 1.0,
                shape_pt_sequence: seq,
                shape_dist_traveled: None,
            }
        }

        let mut a = Feed::new();
        a.shapes.push(ShapeId::from("s1"), point("s1", 0));
        a.shapes.push(ShapeId::from("s1"), point("s1", 1));
        let mut b = Feed::new();
        b.shapes.push(ShapeId::from("s2"), point("s2", 0));

        let output = merge(&[a, b], &MergeConfig::default()).expect("merge ok");
        let s1 = output.feed.shapes.get(&ShapeId::from("s1")).expect("s1 present");
        let s2 = output.feed.shapes.get(&ShapeId::from("s2")).expect("s2 present");
        let mut all_seqs: Vec<u32> = s1.iter().chain(s2.iter()).map(|p| p.shape_pt_sequence).collect();
        all_seqs.sort_unstable();
        assert_eq!(all_seqs, vec![0, 1, 2], "every point across both sources must get a distinct sequence");
    }

    #[test]
    fn error_logging_policy_aborts_merge_on_duplicate() {
        let mut a = Feed::new();
        a.agencies.insert(AgencyId::from("a1"), agency("a1", "From A"));
        let mut b = Feed::new();
        b.agencies.insert(AgencyId::from("a1"), agency("a1", "From B"));

        let mut config = MergeConfig::default();
        config.set_all(DuplicateDetection::Identity, DuplicateLogging::Error);
        let result = merge(&[a, b], &config);
        assert!(matches!(result, Err(MergeError::DuplicateWithErrorLogging { .. })));
    }
}
