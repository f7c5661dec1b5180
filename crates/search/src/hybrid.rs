//! Hybrid retriever: semantic + lexical search with rank fusion
//!
//! This module provides:
//! - HybridRetriever that queries the vector store and the BM25 index
//! - Fusion of both rankings with the configured Fuser
//! - Result materialization with per-stage scores and provenance
//! - Index lifecycle (build, install, save, load)
//!
//! # Architecture
//!
//! ```text
//! query
//!   │
//!   ├──────────────────────┐          (rayon::join)
//!   ▼                      ▼
//! VectorStore::search   Bm25Index::search
//!   │  (id, distance)      │  (id, bm25)
//!   └──────────┬───────────┘
//!              ▼
//!           Fuser
//!              │
//!              ▼
//!   materialize top n_results
//! ```
//!
//! # Degradation
//!
//! - Vector store missing or failing: lexical-only results, logged at warn
//! - No BM25 index installed: semantic-only results
//! - Neither source: empty list
//!
//! Searches never return an error; an empty list means "no context".

use crate::corpus::{build_index, ChunkRecord};
use crate::fuser::{fuser_for, FusedEntry, Fuser};
use crate::index::Bm25Index;
use crate::persist::INDEX_FILE_NAME;
use crate::query::{enhance_query, EnhancedQuery};
use crate::vector::{SemanticHit, VectorStore};
use cyberrag_core::{
    metadata_str, Bm25Params, FusionConfig, Result, RetrievalMethod, RetrievalSource,
    SearchResult, ORIGINAL_TEXT_KEY,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hybrid semantic/lexical retriever
///
/// The BM25 index is held behind a read-write lock: installing or loading
/// an index takes the write side, searches clone an `Arc` snapshot under
/// the read side and never block each other.
pub struct HybridRetriever {
    /// External embedding store, if any
    vector_store: Option<Arc<dyn VectorStore>>,
    /// Current lexical index snapshot
    index: RwLock<Option<Arc<Bm25Index>>>,
    /// Fusion strategy built from `fusion`
    fuser: Arc<dyn Fuser>,
    /// Fusion configuration
    fusion: FusionConfig,
    /// Parameters for indexes built by this retriever
    bm25: Bm25Params,
}

impl HybridRetriever {
    /// Create a retriever with no vector store and no index.
    ///
    /// Fails with `Error::Configuration` on invalid parameters.
    pub fn new(fusion: FusionConfig, bm25: Bm25Params) -> Result<Self> {
        fusion.validate()?;
        bm25.validate()?;
        Ok(HybridRetriever {
            vector_store: None,
            index: RwLock::new(None),
            fuser: Arc::from(fuser_for(&fusion)),
            fusion,
            bm25,
        })
    }

    /// Builder: attach the vector store
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Builder: install a prebuilt index
    pub fn with_index(self, index: Bm25Index) -> Self {
        self.set_index(index);
        self
    }

    /// Fusion configuration in use
    pub fn fusion_config(&self) -> &FusionConfig {
        &self.fusion
    }

    /// Name of the active fuser
    pub fn fuser_name(&self) -> &str {
        self.fuser.name()
    }

    /// Whether a vector store is attached
    pub fn has_vector_store(&self) -> bool {
        self.vector_store.is_some()
    }

    // ========================================================================
    // Index Lifecycle
    // ========================================================================

    /// Build an index from chunk records and install it.
    pub fn build_index<I>(&self, records: I) -> Arc<Bm25Index>
    where
        I: IntoIterator<Item = ChunkRecord>,
    {
        let index = Arc::new(build_index(records, self.bm25));
        *self.index.write() = Some(Arc::clone(&index));
        index
    }

    /// Install an index, replacing the current one.
    pub fn set_index(&self, index: Bm25Index) {
        *self.index.write() = Some(Arc::new(index));
    }

    /// Current index snapshot
    pub fn index(&self) -> Option<Arc<Bm25Index>> {
        self.index.read().clone()
    }

    /// Save the current index as `dir/bm25_index.bin`.
    ///
    /// Returns false when no index is installed.
    pub fn save_index(&self, dir: &Path) -> Result<bool> {
        let index = match self.index() {
            Some(index) => index,
            None => {
                debug!(target: "cyberrag::search", "No BM25 index to save");
                return Ok(false);
            }
        };
        std::fs::create_dir_all(dir)?;
        index.save(&dir.join(INDEX_FILE_NAME))?;
        Ok(true)
    }

    /// Load `dir/bm25_index.bin` and install it.
    ///
    /// Returns false, leaving the current index untouched, when the file
    /// does not exist.
    pub fn load_index(&self, dir: &Path) -> Result<bool> {
        let path = dir.join(INDEX_FILE_NAME);
        if !path.exists() {
            info!(
                target: "cyberrag::search",
                path = %path.display(),
                "No BM25 index found"
            );
            return Ok(false);
        }
        let index = Bm25Index::load(&path)?;
        self.set_index(index);
        Ok(true)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Extract domain signals from a query
    pub fn enhance_query(&self, query: &str) -> EnhancedQuery {
        enhance_query(query)
    }

    /// Semantic-only search.
    ///
    /// Empty when no vector store is attached or the store fails.
    pub fn semantic_search(
        &self,
        query: &str,
        n_results: usize,
        frameworks: Option<&[String]>,
    ) -> Vec<SearchResult> {
        if n_results == 0 {
            return Vec::new();
        }
        self.fetch_semantic(query, n_results, frameworks)
            .unwrap_or_default()
            .into_iter()
            .take(n_results)
            .map(SemanticHit::into_result)
            .collect()
    }

    /// Hybrid search returning at most `n_results` fused results.
    ///
    /// Both sources are asked for `n_results * candidate_multiplier`
    /// candidates; the configured fuser combines them.
    pub fn hybrid_search(
        &self,
        query: &str,
        n_results: usize,
        frameworks: Option<&[String]>,
    ) -> Vec<SearchResult> {
        if n_results == 0 {
            return Vec::new();
        }
        let candidates = n_results.saturating_mul(self.fusion.candidate_multiplier);
        let index = self.index();

        let (semantic, lexical) = rayon::join(
            || self.fetch_semantic(query, candidates, frameworks),
            || {
                index
                    .as_deref()
                    .map(|idx| lexical_candidates(idx, query, candidates, frameworks))
            },
        );

        let source = match (&semantic, &lexical) {
            (Some(_), Some(_)) => RetrievalSource::Hybrid,
            (Some(_), None) => RetrievalSource::Semantic,
            (None, Some(_)) => RetrievalSource::Lexical,
            (None, None) => {
                warn!(
                    target: "cyberrag::search",
                    "No retrieval source available, returning no results"
                );
                return Vec::new();
            }
        };

        let semantic = semantic.unwrap_or_default();
        let lexical = lexical.unwrap_or_default();

        let semantic_ranked: Vec<(String, f64)> = semantic
            .iter()
            .map(|hit| (hit.id.clone(), hit.distance))
            .collect();
        let fused = self.fuser.fuse(&semantic_ranked, &lexical);

        debug!(
            target: "cyberrag::search",
            semantic = semantic.len(),
            lexical = lexical.len(),
            fused = fused.len(),
            fuser = self.fuser.name(),
            source = source.as_str(),
            "Hybrid search fused"
        );

        let method = RetrievalMethod::new(source);
        let semantic_by_id: HashMap<&str, &SemanticHit> = semantic
            .iter()
            .rev()
            .map(|hit| (hit.id.as_str(), hit))
            .collect();

        fused
            .into_iter()
            .take(n_results)
            .filter_map(|entry| {
                materialize(&entry, index.as_deref(), &semantic_by_id, &lexical)
                    .map(|r| r.with_method(method))
            })
            .collect()
    }

    /// Ask the vector store for candidates.
    ///
    /// `None` when the store is absent or the call failed.
    fn fetch_semantic(
        &self,
        query: &str,
        n_results: usize,
        frameworks: Option<&[String]>,
    ) -> Option<Vec<SemanticHit>> {
        let store = self.vector_store.as_ref()?;
        match store.search(query, n_results, frameworks) {
            Ok(hits) => Some(hits),
            Err(e) => {
                warn!(
                    target: "cyberrag::search",
                    store = store.name(),
                    error = %e,
                    "Semantic search failed, continuing without it"
                );
                None
            }
        }
    }
}

/// Lexical candidates, restricted to `frameworks` when given.
fn lexical_candidates(
    index: &Bm25Index,
    query: &str,
    k: usize,
    frameworks: Option<&[String]>,
) -> Vec<(String, f64)> {
    match frameworks {
        Some(wanted) if !wanted.is_empty() => index
            .search(query, index.doc_count())
            .into_iter()
            .filter(|(id, _)| {
                index
                    .document(id)
                    .and_then(|doc| metadata_str(&doc.metadata, cyberrag_core::FRAMEWORK_KEY))
                    .map(|fw| wanted.iter().any(|w| w.eq_ignore_ascii_case(fw)))
                    .unwrap_or(false)
            })
            .take(k)
            .collect(),
        _ => index.search(query, k),
    }
}

/// Resolve a fused id into a full result.
///
/// Prefers the lexical index's stored copy (richer metadata), falls back to
/// the vector store's copy.
fn materialize(
    entry: &FusedEntry,
    index: Option<&Bm25Index>,
    semantic_by_id: &HashMap<&str, &SemanticHit>,
    lexical: &[(String, f64)],
) -> Option<SearchResult> {
    let hit = semantic_by_id.get(entry.id.as_str());

    let mut result = match index.and_then(|idx| idx.document(&entry.id)) {
        Some(doc) => {
            let text = metadata_str(&doc.metadata, ORIGINAL_TEXT_KEY).unwrap_or(&doc.text);
            SearchResult::new(entry.id.clone(), text, doc.metadata.clone())
        }
        None => {
            let hit = hit?;
            SearchResult::new(entry.id.clone(), hit.text.clone(), hit.metadata.clone())
        }
    };

    if let Some(hit) = hit {
        result = result.with_semantic_score(hit.similarity());
    }
    if let Some(rank) = entry.lexical_rank {
        if let Some((_, score)) = lexical.get(rank) {
            result = result.with_bm25_score(*score);
        }
    }
    Some(result.with_hybrid_score(entry.score))
}
