//! Core types for cyberrag
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: error taxonomy and `Result` alias
//! - RetrievalConfig: explicit configuration for index, fusion and reranking
//! - Search types: Document, Metadata, SearchResult, RetrievalMethod, RankedResult

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod search_types;

pub use config::{
    validate_ensemble_weights, Bm25Params, FusionConfig, FusionMethod, RerankConfig,
    RetrievalConfig, CONFIG_FILE_NAME,
};
pub use error::{Error, Result};
pub use search_types::{
    confidence_for, metadata_str, Document, Metadata, RankedResult, RetrievalMethod,
    RetrievalSource, SearchResult, FRAMEWORK_KEY, KEYWORDS_KEY, ORIGINAL_TEXT_KEY,
    SECTION_TITLE_KEY, SUBSECTION_TITLE_KEY,
};
