//! Retrieval without reranking

use crate::common::{basic_corpus, framework_corpus, StaticStore};
use cyberrag::{
    build_index, Bm25Params, FusionConfig, FusionMethod, HybridRetriever, RetrievalSource,
};
use std::sync::Arc;

fn position(ids: &[String], id: &str) -> usize {
    ids.iter().position(|x| x == id).unwrap_or(usize::MAX)
}

#[test]
fn test_basic_scenario_lexical_index() {
    let index = build_index(basic_corpus(), Bm25Params::default());
    let ids: Vec<String> = index
        .search("access control security", 3)
        .into_iter()
        .map(|(id, _)| id)
        .collect();

    assert!(position(&ids, "doc1") < position(&ids, "doc3"));
    assert!(position(&ids, "doc2") < position(&ids, "doc3"));
}

#[test]
fn test_basic_scenario_hybrid_without_store() {
    let retriever = HybridRetriever::new(FusionConfig::default(), Bm25Params::default()).unwrap();
    retriever.build_index(basic_corpus());

    let results = retriever.hybrid_search("access control security", 3, None);
    let ids: Vec<String> = results.iter().map(|r| r.id.clone()).collect();

    assert!(!results.is_empty());
    assert!(position(&ids, "doc1") < position(&ids, "doc3"));
    assert!(position(&ids, "doc2") < position(&ids, "doc3"));
    assert!(results
        .iter()
        .all(|r| r.retrieval_method.source == RetrievalSource::Lexical));
}

#[test]
fn test_top_of_both_lists_wins_fusion() {
    let store = StaticStore::new(&[
        ("soc2_cc6_1", "Logical access security", "SOC2", 0.20),
        ("pci_8_3", "Multi-factor authentication secures remote access", "PCI", 0.25),
        ("unindexed", "Only the vector store knows this one", "ISO", 0.30),
    ]);
    let retriever = HybridRetriever::new(FusionConfig::default(), Bm25Params::default())
        .unwrap()
        .with_vector_store(Arc::new(store));
    retriever.build_index(framework_corpus());

    let results = retriever.hybrid_search("logical access security", 5, None);

    assert_eq!(results[0].id, "soc2_cc6_1");
    assert!(results[0].semantic_score.is_some());
    assert!(results[0].bm25_score.is_some());
    assert!(results.iter().any(|r| r.id == "unindexed"));
    assert!(results
        .iter()
        .all(|r| r.retrieval_method.source == RetrievalSource::Hybrid));
}

#[test]
fn test_framework_filter_applies_to_both_sources() {
    let store = StaticStore::new(&[
        ("pci_8_3", "Multi-factor authentication secures remote access", "PCI", 0.10),
        ("nist_ac_2", "Manage system accounts", "NIST", 0.20),
    ]);
    let retriever = HybridRetriever::new(FusionConfig::default(), Bm25Params::default())
        .unwrap()
        .with_vector_store(Arc::new(store));
    retriever.build_index(framework_corpus());

    let frameworks = vec!["nist".to_string()];
    let results = retriever.hybrid_search("access data", 5, Some(&frameworks));

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.framework == "NIST"));
}

#[test]
fn test_weighted_fusion_scores_in_unit_range() {
    let store = StaticStore::new(&[
        ("nist_ac_2", "Manage system accounts", "NIST", 0.4),
        ("hipaa_164_312", "Technical safeguards", "HIPAA", 0.8),
    ]);
    let fusion = FusionConfig {
        method: FusionMethod::Weighted,
        ..FusionConfig::default()
    };
    let retriever = HybridRetriever::new(fusion, Bm25Params::default())
        .unwrap()
        .with_vector_store(Arc::new(store));
    retriever.build_index(framework_corpus());
    assert_eq!(retriever.fuser_name(), "weighted");

    let results = retriever.hybrid_search("access", 5, None);
    assert!(!results.is_empty());
    for r in &results {
        let score = r.hybrid_score.unwrap();
        assert!((0.0..=1.0 + 1e-9).contains(&score), "{} scored {}", r.id, score);
    }
    for pair in results.windows(2) {
        assert!(pair[0].hybrid_score >= pair[1].hybrid_score);
    }
}

#[test]
fn test_index_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = HybridRetriever::new(FusionConfig::default(), Bm25Params::default()).unwrap();
    first.build_index(framework_corpus());
    assert!(first.save_index(dir.path()).unwrap());
    let before = first.hybrid_search("access privileges", 3, None);

    let second = HybridRetriever::new(FusionConfig::default(), Bm25Params::default()).unwrap();
    assert!(second.load_index(dir.path()).unwrap());
    let after = second.hybrid_search("access privileges", 3, None);

    assert_eq!(before, after);
}

#[test]
fn test_missing_index_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let retriever = HybridRetriever::new(FusionConfig::default(), Bm25Params::default()).unwrap();
    assert!(!retriever.load_index(dir.path()).unwrap());
    assert!(retriever.hybrid_search("anything", 3, None).is_empty());
}
