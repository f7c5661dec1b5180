//! Second-stage ranking for cyberrag
//!
//! This crate provides:
//! - CrossEncoder trait for pluggable (query, passage) scoring models
//! - CrossEncoderReranker with batching, normalization and a threshold floor
//! - EnsembleReranker combining several rerankers by weighted average
//! - RerankStatistics summarizing a reranked result set
//! - RetrievalPipeline wiring hybrid retrieval to reranking
//!
//! # Usage
//!
//! ```ignore
//! use cyberrag_intelligence::{CrossEncoderReranker, RetrievalPipeline, SearchOptions};
//!
//! let reranker = CrossEncoderReranker::new(model, config.rerank.clone())?;
//! let pipeline = RetrievalPipeline::new(retriever, config)?.with_reranker(Arc::new(reranker));
//! let response = pipeline.search("access control", Some(5), None, SearchOptions::default());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pipeline;
pub mod rerank;

pub use pipeline::{PipelineResponse, RetrievalPipeline, SearchOptions};
pub use rerank::{
    CrossEncoder, CrossEncoderReranker, EnsembleReranker, RerankError, RerankResponse,
    RerankStatistics, Reranker, ScoreStatus, NEUTRAL_SCORE,
};
