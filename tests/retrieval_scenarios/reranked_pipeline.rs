//! Retrieval followed by cross-encoder reranking

use crate::common::{basic_corpus, framework_corpus, KeywordModel, StaticStore};
use cyberrag::{
    CrossEncoder, CrossEncoderReranker, EnsembleReranker, HybridRetriever, RerankError,
    RetrievalConfig, RetrievalPipeline, ScoreStatus, SearchOptions,
};
use std::sync::Arc;

struct Failing;

impl CrossEncoder for Failing {
    fn predict(&self, _: &[(String, String)]) -> Result<Vec<f64>, RerankError> {
        Err(RerankError::Prediction("out of memory".into()))
    }
}

fn retriever(config: &RetrievalConfig) -> Arc<HybridRetriever> {
    let store = StaticStore::new(&[
        ("hipaa_164_312", "Technical safeguards control access", "HIPAA", 0.15),
        ("nist_sc_13", "Employ cryptographic protection for data at rest", "NIST", 0.30),
        ("soc2_cc6_1", "Logical access security", "SOC2", 0.35),
    ]);
    let retriever = HybridRetriever::new(config.fusion.clone(), config.bm25)
        .unwrap()
        .with_vector_store(Arc::new(store));
    retriever.build_index(framework_corpus());
    Arc::new(retriever)
}

fn keyword_pipeline() -> RetrievalPipeline {
    let config = RetrievalConfig::default();
    let reranker = CrossEncoderReranker::new(Arc::new(KeywordModel), config.rerank.clone()).unwrap();
    RetrievalPipeline::new(retriever(&config), config)
        .unwrap()
        .with_reranker(Arc::new(reranker))
}

#[test]
fn test_reranked_results_are_tagged_and_ordered() {
    let response = keyword_pipeline().search(
        "access control security",
        Some(3),
        None,
        SearchOptions::default(),
    );

    assert_eq!(response.rerank_status, Some(ScoreStatus::Scored));
    assert!(!response.results.is_empty());
    assert!(response.results.len() <= 3);
    for r in &response.results {
        assert_eq!(r.result.retrieval_method.to_string(), "hybrid+rerank");
        assert_eq!(r.result.rerank_score, Some(r.rerank_score));
        assert!((0.0..=1.0).contains(&r.confidence));
    }
    for pair in response.results.windows(2) {
        assert!(pair[0].rerank_score >= pair[1].rerank_score);
    }
}

#[test]
fn test_basic_scenario_survives_reranking() {
    let config = RetrievalConfig::default();
    let retriever = HybridRetriever::new(config.fusion.clone(), config.bm25).unwrap();
    retriever.build_index(basic_corpus());
    let reranker = CrossEncoderReranker::new(Arc::new(KeywordModel), config.rerank.clone()).unwrap();
    let pipeline = RetrievalPipeline::new(Arc::new(retriever), config)
        .unwrap()
        .with_reranker(Arc::new(reranker));

    let response = pipeline.search("access control security", Some(3), None, SearchOptions::default());
    let ids: Vec<&str> = response.results.iter().map(|r| r.id()).collect();

    assert!(ids.contains(&"doc1"));
    assert!(ids.contains(&"doc2"));
    if let Some(doc3) = ids.iter().position(|id| *id == "doc3") {
        assert!(ids.iter().position(|id| *id == "doc1").unwrap() < doc3);
        assert!(ids.iter().position(|id| *id == "doc2").unwrap() < doc3);
    }
    assert!(response
        .results
        .iter()
        .all(|r| r.result.retrieval_method.to_string() == "lexical+rerank"));
}

#[test]
fn test_failing_model_degrades_to_neutral() {
    let config = RetrievalConfig::default();
    let reranker = CrossEncoderReranker::new(Arc::new(Failing), config.rerank.clone()).unwrap();
    let pipeline = RetrievalPipeline::new(retriever(&config), config)
        .unwrap()
        .with_reranker(Arc::new(reranker));

    let response = pipeline.search("access", Some(3), None, SearchOptions::default());
    assert_eq!(response.rerank_status, Some(ScoreStatus::Neutral));
    assert_eq!(response.results.len(), 3);
    assert!(response.results.iter().all(|r| r.rerank_score == 0.5));
    assert!(response.results.iter().all(|r| r.rank_change == 0));
}

#[test]
fn test_ensemble_of_failures_leaves_fused_order() {
    let config = RetrievalConfig::default();
    let member = CrossEncoderReranker::new(Arc::new(Failing), config.rerank.clone()).unwrap();
    let ensemble = EnsembleReranker::new(config.rerank.clone())
        .unwrap()
        .with_reranker(member.clone())
        .with_reranker(member);
    let retriever = retriever(&config);
    let fused = retriever.hybrid_search("access", 6, None);

    let pipeline = RetrievalPipeline::new(retriever, config)
        .unwrap()
        .with_reranker(Arc::new(ensemble));
    let response = pipeline.search("access", Some(3), None, SearchOptions::default());

    assert_eq!(response.rerank_status, Some(ScoreStatus::Unscored));
    let ids: Vec<&str> = response.results.iter().map(|r| r.id()).collect();
    let expected: Vec<&str> = fused.iter().take(3).map(|r| r.id.as_str()).collect();
    assert_eq!(ids, expected);
    assert!(response
        .results
        .iter()
        .all(|r| r.result.retrieval_method.to_string() == "hybrid"));
}

#[test]
fn test_weak_query_keeps_floor_of_results() {
    let response = keyword_pipeline().search(
        "zero trust microsegmentation access",
        Some(5),
        None,
        SearchOptions::default(),
    );
    // Only "access" matches, so nothing reaches the 0.3 threshold and the
    // floor keeps all five fused candidates
    assert_eq!(response.results.len(), 5);
    assert!(response.results.iter().all(|r| r.rerank_score <= 0.25));
}

#[test]
fn test_reranking_can_be_disabled_per_call() {
    let response = keyword_pipeline().search(
        "access",
        Some(2),
        None,
        SearchOptions::default().reranking(false),
    );
    assert_eq!(response.rerank_status, None);
    assert_eq!(response.results.len(), 2);
    assert!(response
        .results
        .iter()
        .all(|r| !r.result.retrieval_method.reranked));
}
