//! Single-model cross-encoder reranker

use super::passage::build_pairs;
use super::rank::{finish, normalize_scores};
use super::{CrossEncoder, RerankError, RerankResponse, Reranker, ScoreStatus, NEUTRAL_SCORE};
use cyberrag_core::{RerankConfig, Result, SearchResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reranker backed by one cross-encoder model
///
/// Constructed without a model (see [`unavailable`](Self::unavailable)) it
/// still runs the full bookkeeping with neutral scores, so callers can keep
/// one code path whether or not the model loaded.
#[derive(Clone)]
pub struct CrossEncoderReranker {
    model: Option<Arc<dyn CrossEncoder>>,
    config: RerankConfig,
}

impl CrossEncoderReranker {
    /// Create a reranker around a model.
    ///
    /// Fails with `Error::Configuration` on invalid parameters.
    pub fn new(model: Arc<dyn CrossEncoder>, config: RerankConfig) -> Result<Self> {
        config.validate()?;
        Ok(CrossEncoderReranker {
            model: Some(model),
            config,
        })
    }

    /// Create a reranker whose model failed to load.
    pub fn unavailable(config: RerankConfig) -> Result<Self> {
        config.validate()?;
        Ok(CrossEncoderReranker {
            model: None,
            config,
        })
    }

    /// Rerank configuration in use
    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    /// Whether a model is attached
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Name of the underlying model
    pub fn model_name(&self) -> &str {
        self.model.as_deref().map(|m| m.name()).unwrap_or("none")
    }

    /// Build (query, passage) pairs with this reranker's length limits
    pub fn build_pairs(&self, query: &str, candidates: &[SearchResult]) -> Vec<(String, String)> {
        build_pairs(
            query,
            candidates,
            self.config.max_length,
            self.config.query_max_length,
        )
    }

    /// Score pairs in batches of `batch_size`, normalized to [0, 1].
    ///
    /// A missing model, or one reporting itself unavailable, yields neutral
    /// scores. Prediction failures, wrong-length batches and non-finite
    /// scores are returned as errors.
    pub fn score_pairs(
        &self,
        pairs: &[(String, String)],
    ) -> std::result::Result<(Vec<f64>, ScoreStatus), RerankError> {
        let model = match &self.model {
            Some(model) => model,
            None => return Ok((vec![NEUTRAL_SCORE; pairs.len()], ScoreStatus::Neutral)),
        };

        let mut scores = Vec::with_capacity(pairs.len());
        for batch in pairs.chunks(self.config.batch_size.max(1)) {
            let batch_scores = match model.predict(batch) {
                Ok(s) => s,
                Err(RerankError::Unavailable(reason)) => {
                    warn!(
                        target: "cyberrag::rerank",
                        model = model.name(),
                        reason = %reason,
                        "Cross-encoder unavailable, using neutral scores"
                    );
                    return Ok((vec![NEUTRAL_SCORE; pairs.len()], ScoreStatus::Neutral));
                }
                Err(e) => return Err(e),
            };
            if batch_scores.len() != batch.len() {
                return Err(RerankError::ShapeMismatch {
                    expected: batch.len(),
                    actual: batch_scores.len(),
                });
            }
            if batch_scores.iter().any(|s| !s.is_finite()) {
                return Err(RerankError::Prediction("non-finite score".to_string()));
            }
            scores.extend(batch_scores);
        }

        normalize_scores(&mut scores);
        Ok((scores, ScoreStatus::Scored))
    }
}

impl Reranker for CrossEncoderReranker {
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

        debug!(
            target: "cyberrag::rerank",
            candidates = candidates.len(),
            model = self.model_name(),
            "Reranking"
        );

        let pairs = self.build_pairs(query, &candidates);
        let (scores, status) = match self.score_pairs(&pairs) {
            Ok(scored) => scored,
            Err(e) => {
                warn!(
                    target: "cyberrag::rerank",
                    model = self.model_name(),
                    error = %e,
                    "Cross-encoder prediction failed, using neutral scores"
                );
                (vec![NEUTRAL_SCORE; pairs.len()], ScoreStatus::Neutral)
            }
        };

        finish(candidates, &scores, status, self.config.threshold, top_k)
    }

    fn name(&self) -> &str {
        "cross_encoder"
    }
}
