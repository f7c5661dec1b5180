//! Pipelines assembled from configuration files

use crate::common::{framework_corpus, KeywordModel};
use cyberrag::{
    CrossEncoderReranker, Error, FusionMethod, HybridRetriever, RetrievalConfig,
    RetrievalPipeline, SearchOptions, CONFIG_FILE_NAME,
};
use std::sync::Arc;

fn pipeline_from(config: RetrievalConfig) -> RetrievalPipeline {
    let retriever = HybridRetriever::new(config.fusion.clone(), config.bm25).unwrap();
    retriever.build_index(framework_corpus());
    let reranker = CrossEncoderReranker::new(Arc::new(KeywordModel), config.rerank.clone()).unwrap();
    RetrievalPipeline::new(Arc::new(retriever), config)
        .unwrap()
        .with_reranker(Arc::new(reranker))
}

#[test]
fn test_default_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    RetrievalConfig::write_default_if_missing(&path).unwrap();
    let config = RetrievalConfig::from_file(&path).unwrap();

    assert_eq!(config.default_search_results, 7);
    assert_eq!(config.fusion.method, FusionMethod::Rrf);
    assert!(config.rerank.enabled);
}

#[test]
fn test_file_disables_reranking() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "default_search_results = 2\n\n[fusion]\nmethod = \"weighted\"\n\n[rerank]\nenabled = false\n",
    )
    .unwrap();

    let config = RetrievalConfig::from_file(&path).unwrap();
    let pipeline = pipeline_from(config);
    assert_eq!(pipeline.retriever().fuser_name(), "weighted");

    let response = pipeline.search("access", None, None, SearchOptions::default());
    assert_eq!(response.rerank_status, None);
    assert_eq!(response.results.len(), 2);

    // A per-call override still reranks
    let response = pipeline.search("access", None, None, SearchOptions::default().reranking(true));
    assert!(response.rerank_status.is_some());
}

#[test]
fn test_invalid_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[fusion]\ncandidate_multiplier = 0\n").unwrap();

    match RetrievalConfig::from_file(&path) {
        Err(Error::Configuration(msg)) => {
            assert!(msg.contains(CONFIG_FILE_NAME));
            assert!(msg.contains("candidate_multiplier"));
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
}
