//! Cross-encoder re-ranking for search results
//!
//! This module provides second-stage ranking: after fusion produces the top
//! candidates, a cross-encoder rescores (query, passage) pairs for
//! fine-grained relevance ordering.
//!
//! # Architecture
//!
//! ```text
//! HybridRetriever → fused candidates
//!     → cap to max_candidates → build (query, passage) pairs
//!     → CrossEncoder::predict in batches → normalize to [0, 1]
//!     → sort, rank_change, threshold with floor guard
//!     → top_k RankedResults
//! ```
//!
//! The model is called once per batch, never once per pair.
//!
//! # Degradation
//!
//! A missing or failing model yields neutral 0.5 scores and zero
//! confidence, reported as [`ScoreStatus::Neutral`]. An ensemble whose
//! members all fail returns the candidates unscored.

pub mod cross_encoder;
pub mod ensemble;
pub mod error;
pub mod passage;
pub mod rank;
pub mod stats;

pub use cross_encoder::CrossEncoderReranker;
pub use ensemble::EnsembleReranker;
pub use error::RerankError;
pub use passage::{build_pairs, passage_text, truncate_text};
pub use stats::RerankStatistics;

use cyberrag_core::{RankedResult, SearchResult};
use serde::{Deserialize, Serialize};

/// Score assigned to every pair when the model cannot score
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Jointly scores (query, passage) pairs.
///
/// The trait is object-safe for use as `Arc<dyn CrossEncoder>`.
pub trait CrossEncoder: Send + Sync {
    /// Score one batch of pairs; one score per pair, in order.
    fn predict(&self, pairs: &[(String, String)]) -> Result<Vec<f64>, RerankError>;

    /// Model name for logging
    fn name(&self) -> &str {
        "cross_encoder"
    }
}

/// How the scores on a rerank response were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreStatus {
    /// The model scored every candidate
    Scored,
    /// The model was unavailable or failed; every score is 0.5
    Neutral,
    /// No scorer produced usable scores; candidates keep their prior scores
    Unscored,
}

/// Output of a rerank call.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankResponse {
    /// Final ordered results
    pub results: Vec<RankedResult>,
    /// Provenance of the scores
    pub status: ScoreStatus,
    /// Number of candidates that went through the model
    pub reranked: usize,
    /// Whether the threshold filter was replaced by the floor guard
    pub floor_applied: bool,
}

impl RerankResponse {
    /// Response for an empty candidate set
    pub fn empty() -> Self {
        RerankResponse {
            results: Vec::new(),
            status: ScoreStatus::Scored,
            reranked: 0,
            floor_applied: false,
        }
    }

    /// Candidates returned in their original order with prior scores
    pub fn unscored(candidates: Vec<SearchResult>, top_k: Option<usize>) -> Self {
        let limit = top_k.unwrap_or(usize::MAX);
        RerankResponse {
            results: candidates
                .into_iter()
                .take(limit)
                .map(RankedResult::unranked)
                .collect(),
            status: ScoreStatus::Unscored,
            reranked: 0,
            floor_applied: false,
        }
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no results were returned
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Document ids in result order
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.id()).collect()
    }
}

/// Trait for re-ranking implementations.
///
/// # Implementations
///
/// - `CrossEncoderReranker`: a single cross-encoder model
/// - `EnsembleReranker`: weighted average over several models
pub trait Reranker: Send + Sync {
    /// Rescore and reorder `candidates`, returning at most `top_k`.
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
        top_k: Option<usize>,
    ) -> RerankResponse;

    /// Name for logging
    fn name(&self) -> &str;
}
