//! Core search types shared by every retrieval stage
//!
//! This module defines the data model flowing through the pipeline:
//! - Document: immutable unit of retrieval supplied by the corpus loader
//! - Metadata: open key/value map attached to each document
//! - SearchResult: transient value produced by any retrieval stage
//! - RetrievalMethod: provenance tag recorded through the pipeline
//! - RankedResult: SearchResult wrapped with rerank bookkeeping
//!
//! Each stage creates fresh values; a later stage only appends its own score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Open key/value metadata attached to a document.
///
/// Conventional keys: `framework_name`, `section_title`, `subsection_title`,
/// `document`, `chunk_hash`, `keywords`, `original_text`.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key holding the framework tag of a chunk
pub const FRAMEWORK_KEY: &str = "framework_name";
/// Metadata key holding the section title of a chunk
pub const SECTION_TITLE_KEY: &str = "section_title";
/// Metadata key holding the subsection title of a chunk
pub const SUBSECTION_TITLE_KEY: &str = "subsection_title";
/// Metadata key holding the unenriched display text of a chunk
pub const ORIGINAL_TEXT_KEY: &str = "original_text";
/// Metadata key holding extracted keywords of a chunk
pub const KEYWORDS_KEY: &str = "keywords";

/// Read a string-valued metadata entry, ignoring empty strings.
pub fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Document
// ============================================================================

/// Immutable unit of retrieval.
///
/// Created once at index-build time. Re-indexing the same id replaces the
/// stored copy rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique id within an index
    pub id: String,
    /// UTF-8 text used for scoring and display
    pub text: String,
    /// Open key/value metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document without metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Builder: attach a metadata entry
    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Framework tag from metadata, if any
    pub fn framework(&self) -> Option<&str> {
        metadata_str(&self.metadata, FRAMEWORK_KEY)
    }
}

// ============================================================================
// RetrievalMethod
// ============================================================================

/// Which retrieval path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalSource {
    /// Provenance not recorded
    #[default]
    Unknown,
    /// Vector-similarity search only
    Semantic,
    /// BM25 keyword search only
    Lexical,
    /// Fusion of semantic and lexical rankings
    Hybrid,
}

impl RetrievalSource {
    /// Tag used in provenance strings
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalSource::Unknown => "unknown",
            RetrievalSource::Semantic => "semantic",
            RetrievalSource::Lexical => "lexical",
            RetrievalSource::Hybrid => "hybrid",
        }
    }
}

/// Provenance tag recorded through the pipeline.
///
/// Renders as `"semantic"`, `"hybrid"`, `"hybrid+rerank"` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct RetrievalMethod {
    /// First-stage path
    pub source: RetrievalSource,
    /// Whether the cross-encoder rescored the result
    pub reranked: bool,
}

impl RetrievalMethod {
    /// First-stage provenance, not reranked
    pub const fn new(source: RetrievalSource) -> Self {
        RetrievalMethod {
            source,
            reranked: false,
        }
    }

    /// Same provenance with the rerank stage appended
    pub const fn with_rerank(self) -> Self {
        RetrievalMethod {
            source: self.source,
            reranked: true,
        }
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reranked {
            write!(f, "{}+rerank", self.source.as_str())
        } else {
            f.write_str(self.source.as_str())
        }
    }
}

// ============================================================================
// SearchResult
// ============================================================================

/// Result produced by any retrieval stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document id
    pub id: String,
    /// Display text
    pub text: String,
    /// Document metadata
    pub metadata: Metadata,
    /// Originating framework tag (empty when unknown)
    pub framework: String,
    /// Similarity derived from vector distance (`1 - distance`)
    pub semantic_score: Option<f64>,
    /// Raw BM25 score
    pub bm25_score: Option<f64>,
    /// Fused score
    pub hybrid_score: Option<f64>,
    /// Cross-encoder score
    pub rerank_score: Option<f64>,
    /// Provenance tag
    pub retrieval_method: RetrievalMethod,
}

impl SearchResult {
    /// Create an unscored result
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        let framework = metadata_str(&metadata, FRAMEWORK_KEY)
            .unwrap_or_default()
            .to_string();
        SearchResult {
            id: id.into(),
            text: text.into(),
            metadata,
            framework,
            semantic_score: None,
            bm25_score: None,
            hybrid_score: None,
            rerank_score: None,
            retrieval_method: RetrievalMethod::default(),
        }
    }

    /// Builder: override the framework tag
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    /// Builder: set provenance
    pub fn with_method(mut self, method: RetrievalMethod) -> Self {
        self.retrieval_method = method;
        self
    }

    /// Builder: set semantic score
    pub fn with_semantic_score(mut self, score: f64) -> Self {
        self.semantic_score = Some(score);
        self
    }

    /// Builder: set BM25 score
    pub fn with_bm25_score(mut self, score: f64) -> Self {
        self.bm25_score = Some(score);
        self
    }

    /// Builder: set fused score
    pub fn with_hybrid_score(mut self, score: f64) -> Self {
        self.hybrid_score = Some(score);
        self
    }

    /// Section title from metadata, if any
    pub fn section_title(&self) -> Option<&str> {
        metadata_str(&self.metadata, SECTION_TITLE_KEY)
    }

    /// Subsection title from metadata, if any
    pub fn subsection_title(&self) -> Option<&str> {
        metadata_str(&self.metadata, SUBSECTION_TITLE_KEY)
    }

    /// Best score assigned by an earlier stage.
    ///
    /// First present of rerank, hybrid, semantic and BM25 score; 0.0 otherwise.
    pub fn best_prior_score(&self) -> f64 {
        self.rerank_score
            .or(self.hybrid_score)
            .or(self.semantic_score)
            .or(self.bm25_score)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// RankedResult
// ============================================================================

/// Distance of a score from the 0.5 decision boundary, scaled to [0, 1].
#[inline]
pub fn confidence_for(score: f64) -> f64 {
    ((score - 0.5).abs() * 2.0).min(1.0)
}

/// SearchResult wrapped with rerank bookkeeping.
///
/// Created only by the reranking layer; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Underlying result, with `rerank_score` filled in
    pub result: SearchResult,
    /// Score used for the final ordering
    pub rerank_score: f64,
    /// `|rerank_score - 0.5| * 2`
    pub confidence: f64,
    /// `original_rank - new_rank`; positive means promoted
    pub rank_change: i64,
}

impl RankedResult {
    /// Wrap a scored result; confidence is derived from the score
    pub fn new(mut result: SearchResult, rerank_score: f64, rank_change: i64) -> Self {
        result.rerank_score = Some(rerank_score);
        RankedResult {
            result,
            rerank_score,
            confidence: confidence_for(rerank_score),
            rank_change,
        }
    }

    /// Wrap a result that was never rescored.
    ///
    /// Keeps its best prior score, zero confidence and its original position.
    pub fn unranked(result: SearchResult) -> Self {
        RankedResult {
            rerank_score: result.best_prior_score(),
            result,
            confidence: 0.0,
            rank_change: 0,
        }
    }

    /// Document id of the wrapped result
    pub fn id(&self) -> &str {
        &self.result.id
    }
}
