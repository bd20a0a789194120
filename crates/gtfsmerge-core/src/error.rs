//! Error kinds the merge engine itself can raise (§7 of the merge design).
//!
//! Input-side failures — a missing required file, an unreadable ZIP, a
//! malformed CSV row — belong to [`crate::io`] and are not represented
//! here; the engine only ever sees already-parsed [`crate::feed::Feed`]
//! values.
use thiserror::Error;

/// The four error kinds the merge engine can surface.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Fewer than one feed was passed to the merger.
    #[error("at least one input feed is required, got {count}")]
    NoInputFeeds { count: usize },

    /// A strategy failed internally; `entity` names the GTFS table.
    #[error("merge of {entity} failed: {detail}")]
    StrategyFailure { entity: &'static str, detail: String },

    /// An identity duplicate was found while the file's logging policy was
    /// `Error`.
    #[error("duplicate {entity} id {id:?} (source feed {source_index}) rejected by error-logging policy")]
    DuplicateWithErrorLogging {
        entity: &'static str,
        id: String,
        source_index: usize,
    },

    /// A fuzzy duplicate was found while the file's logging policy was
    /// `Error`.
    #[error(
        "fuzzy duplicate {entity}: source id {source_id:?} (source feed {source_index}) matches target id {target_id:?} with score {score:.3}, rejected by error-logging policy"
    )]
    FuzzyDuplicateWithErrorLogging {
        entity: &'static str,
        source_id: String,
        target_id: String,
        score: f64,
        source_index: usize,
    },
}
