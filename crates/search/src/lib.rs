//! Lexical search and hybrid retrieval for cyberrag
//!
//! This crate provides:
//! - Domain-aware tokenizer shared by indexing and querying
//! - Bm25Index: in-memory BM25 index with stored documents and persistence
//! - Corpus ingestion with keyword/section enrichment
//! - Query enhancer extracting keywords and framework mentions
//! - Fuser trait with RRF and weighted score fusion
//! - VectorStore trait for the external embedding store
//! - HybridRetriever orchestrating semantic + lexical search
//!
//! # Usage
//!
//! ```
//! use cyberrag_core::{Bm25Params, FusionConfig};
//! use cyberrag_search::{ChunkRecord, HybridRetriever};
//!
//! let retriever = HybridRetriever::new(FusionConfig::default(), Bm25Params::default()).unwrap();
//! retriever.build_index(vec![
//!     ChunkRecord::new("c1", "Access control policies must be implemented"),
//!     ChunkRecord::new("c2", "Data encryption standards"),
//! ]);
//!
//! let results = retriever.hybrid_search("access control", 5, None);
//! assert_eq!(results[0].id, "c1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod corpus;
pub mod fuser;
pub mod hybrid;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;
pub mod vector;

// Re-export commonly used types
pub use corpus::{build_index, ChunkRecord};
pub use fuser::{fuser_for, FusedEntry, Fuser, RRFFuser, WeightedFuser};
pub use hybrid::HybridRetriever;
pub use index::{Bm25Index, IndexedDocument};
pub use persist::INDEX_FILE_NAME;
pub use query::{enhance_query, EnhancedQuery};
pub use tokenizer::{tokenize, tokenize_unique};
pub use vector::{SemanticHit, VectorStore};
