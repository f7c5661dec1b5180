//! Summary statistics over a reranked result set

use cyberrag_core::RankedResult;
use serde::{Deserialize, Serialize};

/// Confidence above which a result counts as high confidence
const HIGH_CONFIDENCE: f64 = 0.7;
/// Confidence below which a result counts as low confidence
const LOW_CONFIDENCE: f64 = 0.3;

/// Distribution of rerank scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Smallest score
    pub min: f64,
    /// Largest score
    pub max: f64,
    /// Median (mean of the two middle values for even counts)
    pub median: f64,
}

/// Distribution of confidences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Results with confidence > 0.7
    pub high_confidence_count: usize,
    /// Results with confidence < 0.3
    pub low_confidence_count: usize,
}

/// Movement caused by reranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankChangeStats {
    /// Mean absolute rank change
    pub mean_change: f64,
    /// Results moved up
    pub promoted_count: usize,
    /// Results moved down
    pub demoted_count: usize,
    /// Results that kept their position
    pub unchanged_count: usize,
}

/// Statistics about one rerank pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankStatistics {
    /// Number of results summarized
    pub total_results: usize,
    /// Rerank score distribution
    pub score_stats: ScoreStats,
    /// Confidence distribution
    pub confidence_stats: ConfidenceStats,
    /// Rank movement
    pub rank_change_stats: RankChangeStats,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl RerankStatistics {
    /// Summarize a result set; `None` when it is empty.
    pub fn from_results(results: &[RankedResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let scores: Vec<f64> = results.iter().map(|r| r.rerank_score).collect();
        let confidences: Vec<f64> = results.iter().map(|r| r.confidence).collect();

        let score_mean = mean(&scores);
        let variance = scores
            .iter()
            .map(|s| (s - score_mean).powi(2))
            .sum::<f64>()
            / scores.len() as f64;

        let abs_changes: Vec<f64> = results
            .iter()
            .map(|r| r.rank_change.unsigned_abs() as f64)
            .collect();

        Some(RerankStatistics {
            total_results: results.len(),
            score_stats: ScoreStats {
                mean: score_mean,
                std: variance.sqrt(),
                min: scores.iter().copied().fold(f64::INFINITY, f64::min),
                max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                median: median(&scores),
            },
            confidence_stats: ConfidenceStats {
                mean: mean(&confidences),
                high_confidence_count: confidences.iter().filter(|c| **c > HIGH_CONFIDENCE).count(),
                low_confidence_count: confidences.iter().filter(|c| **c < LOW_CONFIDENCE).count(),
            },
            rank_change_stats: RankChangeStats {
                mean_change: mean(&abs_changes),
                promoted_count: results.iter().filter(|r| r.rank_change > 0).count(),
                demoted_count: results.iter().filter(|r| r.rank_change < 0).count(),
                unchanged_count: results.iter().filter(|r| r.rank_change == 0).count(),
            },
        })
    }
}
