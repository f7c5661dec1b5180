//! Rank bookkeeping shared by the single and ensemble rerankers
//!
//! - normalize raw model scores into [0, 1]
//! - sort by score, recording `rank_change = original_index - new_index`
//! - threshold filter with the anti-over-filtering floor

use super::{RerankResponse, ScoreStatus};
use cyberrag_core::{RankedResult, SearchResult};
use std::cmp::Ordering;
use tracing::debug;

/// Filtering may keep no fewer than this share of candidates
const FLOOR_RATIO: f64 = 0.3;
/// Minimum size of the floor-guarded result set
const FLOOR_MIN: usize = 5;

/// Min-max normalize in place when any score falls outside [0, 1].
///
/// `(s - min) / (max - min + 1e-8)`; scores already inside [0, 1] are kept.
pub fn normalize_scores(scores: &mut [f64]) {
    if scores.is_empty() {
        return;
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min < 0.0 || max > 1.0 {
        let range = max - min + 1e-8;
        for s in scores.iter_mut() {
            *s = (*s - min) / range;
        }
    }
}

/// Pair candidates with scores and sort descending.
///
/// Ties keep their original order. Each result's `rank_change` is
/// `original_index - new_index`, so the changes sum to zero.
pub fn rank_by_score(candidates: Vec<SearchResult>, scores: &[f64]) -> Vec<RankedResult> {
    let mut indexed: Vec<(usize, SearchResult, f64)> = candidates
        .into_iter()
        .zip(scores.iter().copied())
        .enumerate()
        .map(|(i, (result, score))| (i, result, score))
        .collect();

    indexed.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));

    indexed
        .into_iter()
        .enumerate()
        .map(|(new_rank, (original_rank, result, score))| {
            RankedResult::new(result, score, original_rank as i64 - new_rank as i64)
        })
        .collect()
}

/// Keep results scoring at least `threshold`.
///
/// If that would keep fewer than 30% of the sorted list, the filter is
/// discarded and the top half (minimum 5) of the unfiltered list is kept
/// instead. Returns the kept results and whether the floor was applied.
pub fn apply_threshold(ranked: Vec<RankedResult>, threshold: f64) -> (Vec<RankedResult>, bool) {
    let total = ranked.len();
    let passing = ranked
        .iter()
        .filter(|r| r.rerank_score >= threshold)
        .count();

    if (passing as f64) < total as f64 * FLOOR_RATIO {
        let keep = FLOOR_MIN.max(total / 2).min(total);
        let mut ranked = ranked;
        ranked.truncate(keep);
        return (ranked, true);
    }

    let filtered = ranked
        .into_iter()
        .filter(|r| r.rerank_score >= threshold)
        .collect();
    (filtered, false)
}

/// Sort, filter and cut a scored candidate set into a response.
pub fn finish(
    candidates: Vec<SearchResult>,
    scores: &[f64],
    status: ScoreStatus,
    threshold: f64,
    top_k: Option<usize>,
) -> RerankResponse {
    let reranked = candidates.len();
    let ranked = rank_by_score(candidates, scores);
    let (mut results, floor_applied) = apply_threshold(ranked, threshold);
    if let Some(k) = top_k {
        results.truncate(k);
    }

    debug!(
        target: "cyberrag::rerank",
        reranked,
        returned = results.len(),
        threshold,
        floor_applied,
        "Reranking complete"
    );

    RerankResponse {
        results,
        status,
        reranked,
        floor_applied,
    }
}
