//! Corpus ingestion
//!
//! Turns chunk records supplied by an upstream loader into a [`Bm25Index`].
//! The text handed to the index is enriched with the chunk's keywords and
//! section titles so they become searchable terms; the unenriched text is
//! kept under the `original_text` metadata key for display.

use crate::index::Bm25Index;
use cyberrag_core::{
    metadata_str, Bm25Params, Document, Metadata, KEYWORDS_KEY, ORIGINAL_TEXT_KEY,
    SECTION_TITLE_KEY, SUBSECTION_TITLE_KEY,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One chunk of a source document, as produced by the upstream chunker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Chunk id, unique across the corpus
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Framework tag, section titles, keywords, source document, ...
    #[serde(default)]
    pub metadata: Metadata,
}

impl ChunkRecord {
    /// Create a record without metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        ChunkRecord {
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

    /// Text handed to the lexical index.
    ///
    /// `text [KEYWORDS: k1 k2 ...] [SECTION: title] [SUBSECTION: title]`
    pub fn indexing_text(&self) -> String {
        let mut enriched = self.text.clone();

        let keywords = keyword_list(&self.metadata);
        if !keywords.is_empty() {
            enriched.push_str(" KEYWORDS: ");
            enriched.push_str(&keywords.join(" "));
        }
        if let Some(section) = metadata_str(&self.metadata, SECTION_TITLE_KEY) {
            enriched.push_str(" SECTION: ");
            enriched.push_str(section);
        }
        if let Some(subsection) = metadata_str(&self.metadata, SUBSECTION_TITLE_KEY) {
            enriched.push_str(" SUBSECTION: ");
            enriched.push_str(subsection);
        }
        enriched
    }
}

impl From<Document> for ChunkRecord {
    fn from(doc: Document) -> Self {
        ChunkRecord {
            id: doc.id,
            text: doc.text,
            metadata: doc.metadata,
        }
    }
}

fn keyword_list(metadata: &Metadata) -> Vec<&str> {
    match metadata.get(KEYWORDS_KEY) {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Build a lexical index over a set of chunk records.
///
/// Records are indexed in iteration order; a repeated id replaces the
/// earlier record.
pub fn build_index<I>(records: I, params: Bm25Params) -> Bm25Index
where
    I: IntoIterator<Item = ChunkRecord>,
{
    let mut index = Bm25Index::new(params);
    let mut total = 0usize;

    for record in records {
        let enriched = record.indexing_text();
        let ChunkRecord {
            id,
            text,
            mut metadata,
        } = record;
        metadata.insert(ORIGINAL_TEXT_KEY.to_string(), serde_json::Value::String(text));
        index.add_document(&id, &enriched, metadata);
        total += 1;
    }

    info!(
        target: "cyberrag::search",
        records = total,
        docs = index.doc_count(),
        vocabulary = index.vocabulary_size(),
        "BM25 index built"
    );
    index
}
