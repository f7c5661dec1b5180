//! cyberrag - hybrid retrieval and reranking for policy and compliance corpora
//!
//! Combines a BM25 keyword index with an external vector store, fuses the
//! two rankings (RRF or weighted), and optionally rescores the fused
//! candidates with a cross-encoder.
//!
//! # Quick Start
//!
//! ```ignore
//! use cyberrag::{ChunkRecord, HybridRetriever, RetrievalConfig, RetrievalPipeline, SearchOptions};
//! use std::sync::Arc;
//!
//! let config = RetrievalConfig::from_file(Path::new("cyberrag.toml"))?;
//! let retriever = HybridRetriever::new(config.fusion.clone(), config.bm25)?
//!     .with_vector_store(store);
//! retriever.build_index(records);
//!
//! let pipeline = RetrievalPipeline::new(Arc::new(retriever), config)?;
//! let response = pipeline.search("access control", Some(5), None, SearchOptions::default());
//! ```
//!
//! # Architecture
//!
//! - `cyberrag-core`: shared types, configuration and errors
//! - `cyberrag-search`: tokenizer, BM25 index, fusion, hybrid retriever
//! - `cyberrag-intelligence`: cross-encoder reranking and the pipeline

pub use cyberrag_core::*;
pub use cyberrag_intelligence::*;
pub use cyberrag_search::*;
