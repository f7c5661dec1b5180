//! End-to-end retrieval pipeline
//!
//! ```text
//! query ──► HybridRetriever (2 × n_results candidates)
//!              │   or semantic-only when hybrid is off
//!              ▼
//!           Reranker (top n_results, tag "+rerank")
//!              │   or top n_results unranked when reranking is off
//!              ▼
//!        Vec<RankedResult>
//! ```

use crate::rerank::{Reranker, ScoreStatus};
use cyberrag_core::{RankedResult, Result, RetrievalConfig, SearchResult};
use cyberrag_search::HybridRetriever;
use std::sync::Arc;
use tracing::debug;

/// Per-call overrides of the pipeline defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Use hybrid retrieval (`None` = pipeline default)
    pub use_hybrid: Option<bool>,
    /// Apply reranking (`None` = `rerank.enabled`)
    pub use_reranking: Option<bool>,
}

impl SearchOptions {
    /// Builder: force hybrid retrieval on or off
    pub fn hybrid(mut self, enabled: bool) -> Self {
        self.use_hybrid = Some(enabled);
        self
    }

    /// Builder: force reranking on or off
    pub fn reranking(mut self, enabled: bool) -> Self {
        self.use_reranking = Some(enabled);
        self
    }
}

/// Results of one pipeline search.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse {
    /// Final results, best first
    pub results: Vec<RankedResult>,
    /// How rerank scores were obtained; `None` when reranking was skipped
    pub rerank_status: Option<ScoreStatus>,
}

impl PipelineResponse {
    fn unranked(results: Vec<SearchResult>, n_results: usize) -> Self {
        PipelineResponse {
            results: results
                .into_iter()
                .take(n_results)
                .map(RankedResult::unranked)
                .collect(),
            rerank_status: None,
        }
    }
}

/// Retrieval followed by optional reranking
pub struct RetrievalPipeline {
    retriever: Arc<HybridRetriever>,
    reranker: Option<Arc<dyn Reranker>>,
    config: RetrievalConfig,
    hybrid_enabled: bool,
}

impl RetrievalPipeline {
    /// Create a pipeline without a reranker.
    ///
    /// Fails with `Error::Configuration` on invalid parameters.
    pub fn new(retriever: Arc<HybridRetriever>, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(RetrievalPipeline {
            retriever,
            reranker: None,
            config,
            hybrid_enabled: true,
        })
    }

    /// Builder: attach a reranker
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Builder: default for hybrid retrieval (on unless disabled here)
    pub fn with_hybrid(mut self, enabled: bool) -> Self {
        self.hybrid_enabled = enabled;
        self
    }

    /// Underlying retriever
    pub fn retriever(&self) -> &Arc<HybridRetriever> {
        &self.retriever
    }

    /// Configuration in use
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Search and optionally rerank.
    ///
    /// Retrieves `candidate_multiplier × n_results` candidates, then reranks
    /// them down to `n_results`. `n_results = None` uses
    /// `default_search_results`.
    pub fn search(
        &self,
        query: &str,
        n_results: Option<usize>,
        frameworks: Option<&[String]>,
        options: SearchOptions,
    ) -> PipelineResponse {
        let n_results = n_results.unwrap_or(self.config.default_search_results);
        if n_results == 0 {
            return PipelineResponse::unranked(Vec::new(), 0);
        }
        let candidates = n_results.saturating_mul(self.config.fusion.candidate_multiplier);

        let use_hybrid = options.use_hybrid.unwrap_or(self.hybrid_enabled);
        let results = if use_hybrid {
            self.retriever.hybrid_search(query, candidates, frameworks)
        } else {
            self.retriever.semantic_search(query, candidates, frameworks)
        };

        debug!(
            target: "cyberrag::search",
            hybrid = use_hybrid,
            candidates = results.len(),
            "Retrieval stage complete"
        );

        let use_reranking = options
            .use_reranking
            .unwrap_or(self.config.rerank.enabled);
        let reranker = match &self.reranker {
            Some(reranker) if use_reranking && !results.is_empty() => reranker,
            _ => return PipelineResponse::unranked(results, n_results),
        };

        let response = reranker.rerank(query, results, Some(n_results));
        let status = response.status;
        let results = response
            .results
            .into_iter()
            .map(|mut ranked| {
                if status != ScoreStatus::Unscored {
                    ranked.result.retrieval_method = ranked.result.retrieval_method.with_rerank();
                }
                ranked
            })
            .collect();

        PipelineResponse {
            results,
            rerank_status: Some(status),
        }
    }
}
