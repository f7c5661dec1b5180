//! Property checks over fusion and the pipeline output

use crate::common::{framework_corpus, KeywordModel, StaticStore};
use cyberrag::{
    fuser_for, CrossEncoderReranker, FusionConfig, FusionMethod, Fuser, HybridRetriever,
    RetrievalConfig, RetrievalPipeline, SearchOptions,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn ranked_list(max: usize) -> impl Strategy<Value = Vec<(String, f64)>> {
    proptest::collection::vec((0usize..12, 0.0f64..10.0), 0..max)
        .prop_map(|items| items.into_iter().map(|(id, s)| (format!("d{}", id), s)).collect())
}

proptest! {
    #[test]
    fn prop_fusion_is_duplicate_free_union(
        semantic in ranked_list(10),
        lexical in ranked_list(10),
        weighted in any::<bool>(),
    ) {
        let config = FusionConfig {
            method: if weighted { FusionMethod::Weighted } else { FusionMethod::Rrf },
            ..FusionConfig::default()
        };
        let fused = fuser_for(&config).fuse(&semantic, &lexical);

        let expected: HashSet<&str> = semantic
            .iter()
            .chain(lexical.iter())
            .map(|(id, _)| id.as_str())
            .collect();
        let ids: Vec<&str> = fused.iter().map(|e| e.id.as_str()).collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();

        prop_assert_eq!(ids.len(), unique.len());
        prop_assert_eq!(unique, expected);
        for pair in fused.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_pipeline_results_serialize_with_provenance() {
    let config = RetrievalConfig::default();
    let store = StaticStore::new(&[("soc2_cc6_1", "Logical access security", "SOC2", 0.2)]);
    let retriever = HybridRetriever::new(config.fusion.clone(), config.bm25)
        .unwrap()
        .with_vector_store(Arc::new(store));
    retriever.build_index(framework_corpus());
    let reranker = CrossEncoderReranker::new(Arc::new(KeywordModel), config.rerank.clone()).unwrap();
    let pipeline = RetrievalPipeline::new(Arc::new(retriever), config)
        .unwrap()
        .with_reranker(Arc::new(reranker));

    let response = pipeline.search("access security", Some(3), None, SearchOptions::default());
    let value = serde_json::to_value(&response.results).unwrap();
    let items = value.as_array().unwrap();

    assert_eq!(items.len(), response.results.len());
    for item in items {
        assert_eq!(item["result"]["retrieval_method"]["source"], "hybrid");
        assert_eq!(item["result"]["retrieval_method"]["reranked"], true);
        assert!(item["rerank_score"].as_f64().is_some());
    }
}
