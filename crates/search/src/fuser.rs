//! Rank fusion for combining semantic and lexical result lists
//!
//! This module provides:
//! - Fuser trait for pluggable fusion algorithms
//! - RRFFuser: Reciprocal Rank Fusion (default)
//! - WeightedFuser: normalized score fusion
//! - fuser_for: select a fuser from configuration
//!
//! Inputs are two ranked lists of `(doc_id, score)`:
//! - semantic: vector distance, lower is better
//! - lexical: BM25 score, higher is better
//!
//! Both fusers produce a total order that is deterministic for identical
//! inputs: fused score descending, then semantic position, then lexical
//! position, then doc id.

use cyberrag_core::{FusionConfig, FusionMethod};
use std::cmp::Ordering;
use std::collections::HashMap;

// ============================================================================
// FusedEntry
// ============================================================================

/// One document in a fused ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedEntry {
    /// Document id
    pub id: String,
    /// Fused score (higher is better)
    pub score: f64,
    /// 0-indexed position in the semantic list, if present
    pub semantic_rank: Option<usize>,
    /// 0-indexed position in the lexical list, if present
    pub lexical_rank: Option<usize>,
}

// ============================================================================
// Fuser Trait
// ============================================================================

/// Pluggable fusion interface
///
/// # Thread Safety
///
/// Fusers must be Send + Sync; one instance serves concurrent searches.
pub trait Fuser: Send + Sync {
    /// Fuse a semantic list (distance ascending) with a lexical list
    /// (score descending) into one ranking over the union of ids.
    fn fuse(&self, semantic: &[(String, f64)], lexical: &[(String, f64)]) -> Vec<FusedEntry>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Build the fuser selected by configuration.
pub fn fuser_for(config: &FusionConfig) -> Box<dyn Fuser> {
    match config.method {
        FusionMethod::Rrf => Box::new(RRFFuser::new(config.rrf_k)),
        FusionMethod::Weighted => Box::new(WeightedFuser::new(
            config.semantic_weight,
            config.bm25_weight,
        )),
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Position of each id in a list; a repeated id keeps its first position.
fn first_positions(list: &[(String, f64)]) -> HashMap<&str, (usize, f64)> {
    let mut positions = HashMap::with_capacity(list.len());
    for (rank, (id, score)) in list.iter().enumerate() {
        positions.entry(id.as_str()).or_insert((rank, *score));
    }
    positions
}

/// Union of ids across both lists, each with its positions.
fn union_ranks<'a>(
    semantic: &'a HashMap<&'a str, (usize, f64)>,
    lexical: &'a HashMap<&'a str, (usize, f64)>,
) -> Vec<(&'a str, Option<usize>, Option<usize>)> {
    let mut ids: Vec<&str> = semantic.keys().copied().collect();
    ids.extend(lexical.keys().copied().filter(|id| !semantic.contains_key(id)));
    ids.into_iter()
        .map(|id| {
            (
                id,
                semantic.get(id).map(|(r, _)| *r),
                lexical.get(id).map(|(r, _)| *r),
            )
        })
        .collect()
}

/// Present ranks sort before absent ones, lower ranks first.
fn cmp_rank(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort fused entries with deterministic tie-breaking.
///
/// 1. Fused score descending
/// 2. Semantic position
/// 3. Lexical position
/// 4. Doc id lexicographic
fn sort_fused(entries: &mut [FusedEntry]) {
    entries.sort_by(|a, b| match b.score.partial_cmp(&a.score) {
        Some(Ordering::Equal) | None => cmp_rank(a.semantic_rank, b.semantic_rank)
            .then_with(|| cmp_rank(a.lexical_rank, b.lexical_rank))
            .then_with(|| a.id.cmp(&b.id)),
        Some(ord) => ord,
    });
}

// ============================================================================
// RRFFuser
// ============================================================================

/// Reciprocal Rank Fusion (RRF)
///
/// RRF Score = sum(1 / (rank + k)) across both lists, rank 0-indexed,
/// where k is a smoothing constant (default 60). Score magnitudes are
/// ignored, which makes RRF robust to the incomparable scales of vector
/// distance and BM25.
///
/// # Example
///
/// ```text
/// Given:
///   - semantic: [d1, d2]
///   - lexical:  [d2, d3]
///   - k = 60
///
/// RRF scores:
///   d1: 1/60          = 0.016667
///   d2: 1/61 + 1/60   = 0.033060  <- highest
///   d3: 1/61          = 0.016393
///
/// Final ranking: [d2, d1, d3]
/// ```
#[derive(Debug, Clone)]
pub struct RRFFuser {
    /// Smoothing constant (default 60)
    k_rrf: u32,
}

impl Default for RRFFuser {
    fn default() -> Self {
        RRFFuser { k_rrf: 60 }
    }
}

impl RRFFuser {
    /// Create a new RRFFuser with custom k value
    pub fn new(k_rrf: u32) -> Self {
        RRFFuser { k_rrf }
    }

    /// Get the k parameter
    pub fn k_rrf(&self) -> u32 {
        self.k_rrf
    }

    #[inline]
    fn contribution(&self, rank: Option<usize>) -> f64 {
        rank.map(|r| 1.0 / (r as f64 + self.k_rrf as f64))
            .unwrap_or(0.0)
    }
}

impl Fuser for RRFFuser {
    fn fuse(&self, semantic: &[(String, f64)], lexical: &[(String, f64)]) -> Vec<FusedEntry> {
        let sem = first_positions(semantic);
        let lex = first_positions(lexical);

        let mut entries: Vec<FusedEntry> = union_ranks(&sem, &lex)
            .into_iter()
            .map(|(id, semantic_rank, lexical_rank)| FusedEntry {
                id: id.to_string(),
                score: self.contribution(semantic_rank) + self.contribution(lexical_rank),
                semantic_rank,
                lexical_rank,
            })
            .collect();

        sort_fused(&mut entries);
        entries
    }

    fn name(&self) -> &str {
        "rrf"
    }
}

// ============================================================================
// WeightedFuser
// ============================================================================

/// Weighted score fusion
///
/// Each list is normalized to [0, 1]:
/// - semantic: `1 - distance / max_distance` (so higher is better)
/// - lexical: `bm25 / max_bm25`
///
/// and combined as `semantic_weight * sem + bm25_weight * bm25`. A document
/// missing from a list contributes 0 for that list. Weights are used as
/// given; callers normalize them.
#[derive(Debug, Clone)]
pub struct WeightedFuser {
    semantic_weight: f64,
    bm25_weight: f64,
}

impl Default for WeightedFuser {
    fn default() -> Self {
        WeightedFuser::new(0.6, 0.4)
    }
}

impl WeightedFuser {
    /// Create a new WeightedFuser
    pub fn new(semantic_weight: f64, bm25_weight: f64) -> Self {
        WeightedFuser {
            semantic_weight,
            bm25_weight,
        }
    }

    /// Weight of the semantic signal
    pub fn semantic_weight(&self) -> f64 {
        self.semantic_weight
    }

    /// Weight of the lexical signal
    pub fn bm25_weight(&self) -> f64 {
        self.bm25_weight
    }
}

fn max_score(list: &[(String, f64)]) -> f64 {
    list.iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max)
}

impl Fuser for WeightedFuser {
    fn fuse(&self, semantic: &[(String, f64)], lexical: &[(String, f64)]) -> Vec<FusedEntry> {
        let sem = first_positions(semantic);
        let lex = first_positions(lexical);

        let max_distance = max_score(semantic);
        let max_bm25 = max_score(lexical);

        let sem_norm = |distance: f64| {
            if max_distance > 0.0 {
                1.0 - distance / max_distance
            } else {
                1.0
            }
        };
        let bm25_norm = |score: f64| {
            if max_bm25 > 0.0 {
                score / max_bm25
            } else {
                0.0
            }
        };

        let mut entries: Vec<FusedEntry> = union_ranks(&sem, &lex)
            .into_iter()
            .map(|(id, semantic_rank, lexical_rank)| {
                let s = sem.get(id).map(|(_, d)| sem_norm(*d)).unwrap_or(0.0);
                let l = lex.get(id).map(|(_, b)| bm25_norm(*b)).unwrap_or(0.0);
                FusedEntry {
                    id: id.to_string(),
                    score: self.semantic_weight * s + self.bm25_weight * l,
                    semantic_rank,
                    lexical_rank,
                }
            })
            .collect();

        sort_fused(&mut entries);
        entries
    }

    fn name(&self) -> &str {
        "weighted"
    }
}

// ============================================================================
// Tests
// ============================================================================
