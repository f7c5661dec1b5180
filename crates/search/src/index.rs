//! In-memory BM25 index for keyword search
//!
//! This module provides:
//! - Bm25Index with per-term posting maps
//! - Incremental corpus statistics (doc_count, avg_doc_length)
//! - Stored text/metadata for result materialization
//! - Ranked keyword search
//!
//! # Invariants
//!
//! - A term appears in `postings` iff at least one document has tf ≥ 1
//! - `doc_count == doc_lengths.len()`
//! - `avg_doc_length == mean(doc_lengths)` after every mutation
//!
//! # Concurrency
//!
//! Mutation takes `&mut self`. The intended discipline is single writer,
//! many readers: build the index, then share it behind an `Arc` for
//! concurrent read-only searches.

use crate::tokenizer::{tokenize, tokenize_unique};
use cyberrag_core::{Bm25Params, Metadata};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// ============================================================================
// IndexedDocument
// ============================================================================

/// Stored copy of an indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Text that was tokenized
    pub text: String,
    /// Metadata supplied at indexing time
    pub metadata: Metadata,
    /// Insertion sequence, used to break score ties
    pub seq: u64,
}

// ============================================================================
// Bm25Index
// ============================================================================

/// BM25 index over a chunk corpus
///
/// # BM25 Formula
///
/// For each query term t present in document d:
/// score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
///
/// with IDF(t) = max(epsilon, ln((N - df + 0.5) / (df + 0.5))) for indexed
/// terms and 0 for terms the corpus never contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bm25Index {
    /// Scoring parameters, fixed at construction
    params: Bm25Params,

    /// Term -> (doc id -> term frequency)
    postings: HashMap<String, HashMap<String, u32>>,

    /// Distinct terms currently indexed
    vocabulary: HashSet<String>,

    /// Doc id -> token count
    doc_lengths: HashMap<String, u32>,

    /// Doc id -> stored text and metadata
    documents: HashMap<String, IndexedDocument>,

    /// Number of indexed documents
    doc_count: usize,

    /// Sum of all document lengths
    total_doc_len: u64,

    /// Mean document length (0 when empty)
    avg_doc_length: f64,

    /// Next insertion sequence number
    next_seq: u64,
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new(Bm25Params::default())
    }
}

impl Bm25Index {
    /// Create an empty index with the given parameters
    pub fn new(params: Bm25Params) -> Self {
        Bm25Index {
            params,
            postings: HashMap::new(),
            vocabulary: HashSet::new(),
            doc_lengths: HashMap::new(),
            documents: HashMap::new(),
            doc_count: 0,
            total_doc_len: 0,
            avg_doc_length: 0.0,
            next_seq: 0,
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Scoring parameters
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Number of indexed documents
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Whether the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    /// Mean document length in tokens (0 when empty)
    pub fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    /// Number of distinct indexed terms
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether a term is indexed
    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains(term)
    }

    /// Number of documents containing a term
    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings.get(term).map(|p| p.len()).unwrap_or(0)
    }

    /// Frequency of a term inside one document
    pub fn term_freq(&self, term: &str, doc_id: &str) -> u32 {
        self.postings
            .get(term)
            .and_then(|p| p.get(doc_id))
            .copied()
            .unwrap_or(0)
    }

    /// Token count of a document
    pub fn doc_length(&self, doc_id: &str) -> Option<u32> {
        self.doc_lengths.get(doc_id).copied()
    }

    /// Stored copy of a document
    pub fn document(&self, doc_id: &str) -> Option<&IndexedDocument> {
        self.documents.get(doc_id)
    }

    /// Whether a document id is indexed
    pub fn contains(&self, doc_id: &str) -> bool {
        self.documents.contains_key(doc_id)
    }

    /// Inverse document frequency of a term.
    ///
    /// `max(epsilon, ln((N - df + 0.5) / (df + 0.5)))` for indexed terms.
    /// Terms absent from the index score exactly 0.0, a no-match signal
    /// distinct from the epsilon floor.
    pub fn idf(&self, term: &str) -> f64 {
        let df = match self.postings.get(term) {
            Some(p) if !p.is_empty() => p.len() as f64,
            _ => return 0.0,
        };
        let n = self.doc_count as f64;
        let idf = ((n - df + 0.5) / (df + 0.5)).ln();
        idf.max(self.params.epsilon)
    }

    // ========================================================================
    // Index Updates
    // ========================================================================

    /// Index a document.
    ///
    /// Re-adding an existing id first removes every posting of the previous
    /// revision, so terms dropped between revisions leave nothing behind and
    /// `doc_count` is not incremented twice.
    pub fn add_document(&mut self, doc_id: &str, text: &str, metadata: Metadata) {
        if self.documents.contains_key(doc_id) {
            self.remove_postings(doc_id);
        }

        let tokens = tokenize(text);
        let doc_len = tokens.len() as u32;

        let mut tf_map: HashMap<String, u32> = HashMap::new();
        for token in tokens {
            *tf_map.entry(token).or_insert(0) += 1;
        }

        for (term, tf) in tf_map {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(doc_id.to_string(), tf);
            self.vocabulary.insert(term);
        }

        // Keep the original insertion slot on re-add
        let seq = match self.documents.get(doc_id) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.documents.insert(
            doc_id.to_string(),
            IndexedDocument {
                text: text.to_string(),
                metadata,
                seq,
            },
        );

        if let Some(old_len) = self.doc_lengths.insert(doc_id.to_string(), doc_len) {
            self.total_doc_len -= old_len as u64;
        }
        self.total_doc_len += doc_len as u64;
        self.doc_count = self.doc_lengths.len();
        self.update_avg_length();
    }

    /// Remove a document entirely.
    ///
    /// Returns true if the document was indexed.
    pub fn remove_document(&mut self, doc_id: &str) -> bool {
        if !self.documents.contains_key(doc_id) {
            return false;
        }
        self.remove_postings(doc_id);
        self.documents.remove(doc_id);
        if let Some(len) = self.doc_lengths.remove(doc_id) {
            self.total_doc_len -= len as u64;
        }
        self.doc_count = self.doc_lengths.len();
        self.update_avg_length();
        true
    }

    /// Drop a document's postings.
    ///
    /// Only the terms of the stored text are visited; it is the exact text
    /// that produced the postings.
    fn remove_postings(&mut self, doc_id: &str) {
        let terms = match self.documents.get(doc_id) {
            Some(doc) => tokenize_unique(&doc.text),
            None => return,
        };
        for term in terms {
            let emptied = match self.postings.get_mut(&term) {
                Some(docs) => {
                    docs.remove(doc_id);
                    docs.is_empty()
                }
                None => false,
            };
            if emptied {
                self.postings.remove(&term);
                self.vocabulary.remove(&term);
            }
        }
    }

    fn update_avg_length(&mut self) {
        self.avg_doc_length = if self.doc_count == 0 {
            0.0
        } else {
            self.total_doc_len as f64 / self.doc_count as f64
        };
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// BM25 score of one document for already-tokenized query terms.
    ///
    /// Query terms that never occur in the corpus contribute zero; repeated
    /// query terms contribute once per occurrence.
    pub fn score(&self, doc_id: &str, query_terms: &[String]) -> f64 {
        if self.doc_count == 0 {
            return 0.0;
        }
        let doc_len = match self.doc_lengths.get(doc_id) {
            Some(len) => *len as f64,
            None => return 0.0,
        };

        let k1 = self.params.k1;
        let b = self.params.b;
        let norm = if self.avg_doc_length > 0.0 {
            doc_len / self.avg_doc_length
        } else {
            0.0
        };

        let mut score = 0.0;
        for term in query_terms {
            let tf = match self.postings.get(term).and_then(|p| p.get(doc_id)) {
                Some(tf) => *tf as f64,
                None => continue,
            };
            let idf = self.idf(term);
            let tf_component = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * norm));
            score += idf * tf_component;
        }
        score
    }

    /// Search the index and return the top-k `(doc_id, score)` pairs.
    ///
    /// Only documents containing at least one query term are scored;
    /// documents scoring exactly 0.0 are left out. Ties keep insertion order.
    pub fn search(&self, query: &str, k: usize) -> Vec<(String, f64)> {
        let query_terms = tokenize(query);
        self.search_terms(&query_terms, k)
    }

    /// Same as [`search`](Self::search) for pre-tokenized terms.
    pub fn search_terms(&self, query_terms: &[String], k: usize) -> Vec<(String, f64)> {
        if query_terms.is_empty() || self.doc_count == 0 || k == 0 {
            return Vec::new();
        }

        let mut candidates: HashSet<&str> = HashSet::new();
        for term in query_terms {
            if let Some(docs) = self.postings.get(term) {
                candidates.extend(docs.keys().map(String::as_str));
            }
        }

        let mut scored: Vec<(&str, u64, f64)> = candidates
            .into_iter()
            .filter_map(|doc_id| {
                let score = self.score(doc_id, query_terms);
                if score == 0.0 {
                    return None;
                }
                let seq = self.documents.get(doc_id).map(|d| d.seq).unwrap_or(u64::MAX);
                Some((doc_id, seq, score))
            })
            .collect();

        scored.sort_by(|a, b| match b.2.partial_cmp(&a.2) {
            Some(Ordering::Equal) | None => a.1.cmp(&b.1),
            Some(ord) => ord,
        });

        scored
            .into_iter()
            .take(k)
            .map(|(doc_id, _, score)| (doc_id.to_string(), score))
            .collect()
    }

    /// Iterate indexed document ids in insertion order
    pub fn doc_ids(&self) -> Vec<&str> {
        let mut ids: Vec<(&str, u64)> = self
            .documents
            .iter()
            .map(|(id, d)| (id.as_str(), d.seq))
            .collect();
        ids.sort_by_key(|(_, seq)| *seq);
        ids.into_iter().map(|(id, _)| id).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
