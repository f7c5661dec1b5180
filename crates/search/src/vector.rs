//! Vector-store collaborator interface
//!
//! The embedding store lives outside this crate. The retriever only needs
//! one capability from it: similarity search with an optional framework
//! filter, returning hits with a distance where lower is better.

use cyberrag_core::{Metadata, Result, RetrievalMethod, RetrievalSource, SearchResult};
use serde::{Deserialize, Serialize};

/// One hit returned by a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticHit {
    /// Document id, used verbatim as the fusion key
    pub id: String,
    /// Document text
    pub text: String,
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Cosine or L2 distance (lower is better)
    pub distance: f64,
}

impl SemanticHit {
    /// Create a hit
    pub fn new(id: impl Into<String>, text: impl Into<String>, distance: f64) -> Self {
        SemanticHit {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
            distance,
        }
    }

    /// Builder: attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Similarity derived from the distance
    pub fn similarity(&self) -> f64 {
        1.0 - self.distance
    }

    /// Convert to a semantic-only search result
    pub fn into_result(self) -> SearchResult {
        let similarity = self.similarity();
        SearchResult::new(self.id, self.text, self.metadata)
            .with_semantic_score(similarity)
            .with_method(RetrievalMethod::new(RetrievalSource::Semantic))
    }
}

/// Similarity search over an external embedding store.
///
/// # Thread Safety
///
/// Implementations must be Send + Sync; the retriever calls `search`
/// concurrently with its own lexical search.
pub trait VectorStore: Send + Sync {
    /// Return up to `n_results` hits ordered by ascending distance,
    /// restricted to `frameworks` when given.
    fn search(
        &self,
        query: &str,
        n_results: usize,
        frameworks: Option<&[String]>,
    ) -> Result<Vec<SemanticHit>>;

    /// Name for debugging and logging
    fn name(&self) -> &str {
        "vector_store"
    }
}
