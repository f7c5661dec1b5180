//! Shared fixtures for the retrieval scenarios

use cyberrag::{
    ChunkRecord, CrossEncoder, RerankError, Result, SemanticHit, VectorStore, FRAMEWORK_KEY,
    SECTION_TITLE_KEY,
};

/// The three-document corpus used by the basic scenario.
pub fn basic_corpus() -> Vec<ChunkRecord> {
    vec![
        ChunkRecord::new("doc1", "Access control policies must be implemented for all systems"),
        ChunkRecord::new("doc2", "Security controls require regular audit and assessment procedures"),
        ChunkRecord::new("doc3", "Data encryption standards should follow industry best practices"),
    ]
}

/// A small multi-framework corpus.
pub fn framework_corpus() -> Vec<ChunkRecord> {
    vec![
        ChunkRecord::new("nist_ac_2", "Manage system accounts and review access privileges")
            .with_meta(FRAMEWORK_KEY, "NIST")
            .with_meta(SECTION_TITLE_KEY, "AC-2 Account Management"),
        ChunkRecord::new("soc2_cc6_1", "Logical access security restricts access to information assets")
            .with_meta(FRAMEWORK_KEY, "SOC2")
            .with_meta(SECTION_TITLE_KEY, "CC6.1"),
        ChunkRecord::new("hipaa_164_312", "Technical safeguards control access to protected health information")
            .with_meta(FRAMEWORK_KEY, "HIPAA"),
        ChunkRecord::new("pci_8_3", "Multi-factor authentication secures remote access to the cardholder environment")
            .with_meta(FRAMEWORK_KEY, "PCI"),
        ChunkRecord::new("nist_sc_13", "Employ cryptographic protection for data at rest")
            .with_meta(FRAMEWORK_KEY, "NIST"),
    ]
}

/// Vector store returning a fixed ranking, honoring the framework filter.
pub struct StaticStore {
    hits: Vec<(String, String, String, f64)>,
}

impl StaticStore {
    /// `(id, text, framework, distance)` in ranked order
    pub fn new(hits: &[(&str, &str, &str, f64)]) -> Self {
        StaticStore {
            hits: hits
                .iter()
                .map(|(id, text, fw, d)| (id.to_string(), text.to_string(), fw.to_string(), *d))
                .collect(),
        }
    }
}

impl VectorStore for StaticStore {
    fn search(
        &self,
        _query: &str,
        n_results: usize,
        frameworks: Option<&[String]>,
    ) -> Result<Vec<SemanticHit>> {
        Ok(self
            .hits
            .iter()
            .filter(|(_, _, fw, _)| {
                frameworks.map_or(true, |allowed| allowed.iter().any(|a| a.eq_ignore_ascii_case(fw)))
            })
            .take(n_results)
            .map(|(id, text, fw, d)| {
                let mut metadata = cyberrag::Metadata::new();
                metadata.insert(FRAMEWORK_KEY.to_string(), fw.as_str().into());
                SemanticHit::new(id.as_str(), text.as_str(), *d).with_metadata(metadata)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Cross-encoder scoring by the share of query words found in the passage.
pub struct KeywordModel;

impl CrossEncoder for KeywordModel {
    fn predict(&self, pairs: &[(String, String)]) -> std::result::Result<Vec<f64>, RerankError> {
        Ok(pairs
            .iter()
            .map(|(query, passage)| {
                let passage = passage.to_lowercase();
                let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
                let hits = words.iter().filter(|w| passage.contains(w.as_str())).count();
                hits as f64 / words.len().max(1) as f64
            })
            .collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
