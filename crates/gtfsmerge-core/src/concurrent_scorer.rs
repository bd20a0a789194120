//! Optional worker-pool fuzzy scorer (§4.21).
//!
//! Scoring one source entity against every candidate already in the target
//! is embarrassingly parallel and pure (no shared mutable state), which is
//! exactly `rayon`'s par-iter niche. The sequential and concurrent paths
//! must pick the same winner for the same input: both reduce to "first
//! strictly-higher score encountered in candidate order," so running the
//! scoring in parallel and then folding the `(index, score)` pairs
//! sequentially keeps the result identical to a plain sequential scan.
use rayon::prelude::*;

/// Scores every candidate against `score_fn` and returns the index and
/// score of the best match, or `None` if `candidates` is empty.
///
/// Uses a sequential scan when `candidates.len() < min_candidates` or
/// `use_concurrency` is false; otherwise scores candidates in parallel via
/// rayon before folding. Either path yields the same winner: the first
/// candidate (in input order) achieving the maximum score.
pub fn best_match<C, F>(
    candidates: &[C],
    score_fn: F,
    min_candidates: usize,
    use_concurrency: bool,
) -> Option<(usize, f64)>
where
    C: Sync,
    F: Fn(&C) -> f64 + Sync,
{
    if candidates.is_empty() {
        return None;
    }

    if use_concurrency && candidates.len() >= min_candidates {
        let scored: Vec<(usize, f64)> = candidates
            .par_iter()
            .enumerate()
            .map(|(i, c)| (i, score_fn(c)))
            .collect();
        fold_best(scored.into_iter())
    } else {
        let scored = candidates.iter().enumerate().map(|(i, c)| (i, score_fn(c)));
        fold_best(scored)
    }
}

/// First strictly-higher score wins; later candidates with an equal score
/// never displace an earlier one.
fn fold_best(scored: impl Iterator<Item = (usize, f64)>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scored {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best
}
