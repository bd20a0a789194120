//! The fifteen per-entity-type merge strategies (§4.4–§4.15, §4.22).
//!
//! Each submodule exposes one `merge_*` function taking the active
//! [`crate::context::MergeContext`], the source feed, the mutable target
//! feed, and the file's resolved [`crate::policy::StrategyPolicy`]. The
//! driver ([`crate::merge`]) invokes them in dependency order so that a
//! strategy's foreign-key lookups always see mappings already populated by
//! the strategies that ran before it.
pub mod agency;
pub mod area;
pub mod calendar;
pub mod calendar_date;
pub mod fare_attribute;
pub mod fare_rule;
pub mod feed_info;
pub mod frequency;
pub mod pathway;
pub mod route;
pub mod shape;
pub mod stop;
pub mod stop_time;
pub mod transfer;
pub mod trip;

use crate::error::MergeError;
use crate::policy::{DuplicateLogging, StrategyPolicy};

/// Resolves the new id for a colliding source id under the `Context`
/// renaming rule, or the source id unchanged when there is no collision
/// (§4.2 step 3).
pub(crate) fn resolve_new_id(prefix: &str, source_id: &str, target_has_id: bool) -> String {
    if target_has_id {
        crate::context::renamed(prefix, source_id)
    } else {
        source_id.to_owned()
    }
}

/// Applies a file's logging policy to a detected identity duplicate.
pub(crate) fn identity_duplicate_log(
    policy: StrategyPolicy,
    entity: &'static str,
    id: &str,
    source_index: usize,
) -> Result<(), MergeError> {
    match policy.logging {
        DuplicateLogging::None => Ok(()),
        DuplicateLogging::Warning => {
            log::warn!("duplicate {entity} id {id:?} from source feed {source_index}");
            Ok(())
        }
        DuplicateLogging::Error => Err(MergeError::DuplicateWithErrorLogging {
            entity,
            id: id.to_owned(),
            source_index,
        }),
    }
}

/// Applies a file's logging policy to a detected fuzzy duplicate.
pub(crate) fn fuzzy_duplicate_log(
    policy: StrategyPolicy,
    entity: &'static str,
    source_id: &str,
    target_id: &str,
    score: f64,
    source_index: usize,
) -> Result<(), MergeError> {
    match policy.logging {
        DuplicateLogging::None => Ok(()),
        DuplicateLogging::Warning => {
            log::warn!(
                "fuzzy duplicate {entity}: source id {source_id:?} matches target id {target_id:?} (score {score:.3}, source feed {source_index})"
            );
            Ok(())
        }
        DuplicateLogging::Error => Err(MergeError::FuzzyDuplicateWithErrorLogging {
            entity,
            source_id: source_id.to_owned(),
            target_id: target_id.to_owned(),
            score,
            source_index,
        }),
    }
}
