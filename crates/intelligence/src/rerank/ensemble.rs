//! Ensemble reranking over several cross-encoders
//!
//! Every member scores the same (capped) candidate set; the raw member
//! scores are combined by weighted average, then sorted and filtered once.
//!
//! # Member failures
//!
//! - Model unavailable: member contributes neutral 0.5 scores
//! - Prediction error or wrong-length vector: member is excluded and the
//!   remaining weights are renormalized
//! - Every member excluded: candidates are returned unscored

use super::cross_encoder::CrossEncoderReranker;
use super::rank::finish;
use super::{RerankResponse, Reranker, ScoreStatus};
use cyberrag_core::{validate_ensemble_weights, Error, RerankConfig, Result, SearchResult};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Weighted-average ensemble of cross-encoder rerankers
pub struct EnsembleReranker {
    members: Vec<CrossEncoderReranker>,
    weights: Vec<f64>,
    config: RerankConfig,
}

impl EnsembleReranker {
    /// Create an empty ensemble.
    ///
    /// `config.ensemble_weights` supplies default weights for members
    /// added with [`with_reranker`](Self::with_reranker), by position.
    pub fn new(config: RerankConfig) -> Result<Self> {
        config.validate()?;
        Ok(EnsembleReranker {
            members: Vec::new(),
            weights: Vec::new(),
            config,
        })
    }

    /// Builder: add a member with its configured weight (1.0 when unset)
    pub fn with_reranker(mut self, reranker: CrossEncoderReranker) -> Self {
        let weight = self
            .config
            .ensemble_weights
            .get(self.members.len())
            .copied()
            .unwrap_or(1.0);
        self.members.push(reranker);
        self.weights.push(weight);
        self
    }

    /// Add a member with an explicit weight.
    ///
    /// Fails with `Error::Configuration` for zero, negative or non-finite weights.
    pub fn add_reranker(&mut self, reranker: CrossEncoderReranker, weight: f64) -> Result<()> {
        validate_ensemble_weights(&[weight]).map_err(|_| {
            Error::configuration(format!(
                "ensemble weight must be a positive number, got {}",
                weight
            ))
        })?;
        self.members.push(reranker);
        self.weights.push(weight);
        Ok(())
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the ensemble has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member weights, in member order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Combine member score vectors by weighted average.
    ///
    /// Weights are renormalized over the given members; if they do not sum to
    /// a positive total every member counts equally.
    fn combine(members: &[(f64, Vec<f64>)], len: usize) -> Vec<f64> {
        let total: f64 = members.iter().map(|(w, _)| *w).sum();
        let equal = total <= 0.0;
        let denom = if equal { members.len() as f64 } else { total };

        let mut combined = vec![0.0; len];
        for (weight, scores) in members {
            let w = if equal { 1.0 } else { *weight };
            for (acc, s) in combined.iter_mut().zip(scores) {
                *acc += s * w / denom;
            }
        }
        combined
    }
}

impl Reranker for EnsembleReranker {
    fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<SearchResult>,
        top_k: Option<usize>,
    ) -> RerankResponse {
        if candidates.is_empty() {
            return RerankResponse::empty();
        }
        candidates.truncate(self.config.max_candidates);

        if self.members.is_empty() {
            warn!(target: "cyberrag::rerank", "No rerankers in ensemble, returning candidates unscored");
            return RerankResponse::unscored(candidates, top_k);
        }

        let pairs = super::passage::build_pairs(
            query,
            &candidates,
            self.config.max_length,
            self.config.query_max_length,
        );
        let expected = candidates.len();

        let outcomes: Vec<Option<(f64, Vec<f64>, ScoreStatus)>> = self
            .members
            .par_iter()
            .zip(self.weights.par_iter())
            .enumerate()
            .map(|(i, (member, weight))| match member.score_pairs(&pairs) {
                Ok((scores, _)) if scores.len() != expected => {
                    warn!(
                        target: "cyberrag::rerank",
                        member = i,
                        expected,
                        actual = scores.len(),
                        "Ensemble member returned wrong number of scores, excluding it"
                    );
                    None
                }
                Ok((scores, status)) => Some((*weight, scores, status)),
                Err(e) => {
                    warn!(
                        target: "cyberrag::rerank",
                        member = i,
                        model = member.model_name(),
                        error = %e,
                        "Ensemble member failed, excluding it"
                    );
                    None
                }
            })
            .collect();

        let mut any_scored = false;
        let participating: Vec<(f64, Vec<f64>)> = outcomes
            .into_iter()
            .flatten()
            .map(|(weight, scores, status)| {
                any_scored |= status == ScoreStatus::Scored;
                (weight, scores)
            })
            .collect();

        if participating.is_empty() {
            warn!(
                target: "cyberrag::rerank",
                members = self.members.len(),
                "Every ensemble member failed, returning candidates unscored"
            );
            return RerankResponse::unscored(candidates, top_k);
        }

        debug!(
            target: "cyberrag::rerank",
            members = self.members.len(),
            participating = participating.len(),
            candidates = expected,
            "Ensemble scores combined"
        );

        let combined = Self::combine(&participating, expected);
        let status = if any_scored {
            ScoreStatus::Scored
        } else {
            ScoreStatus::Neutral
        };
        finish(candidates, &combined, status, self.config.threshold, top_k)
    }

    fn name(&self) -> &str {
        "ensemble"
    }
}
