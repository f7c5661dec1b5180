//! Error types for re-ranking

use std::fmt;

/// Errors a cross-encoder can report
///
/// None of these reach callers of a rerank: the reranker degrades to
/// neutral scores and the ensemble excludes the failing member.
#[derive(Debug, Clone, PartialEq)]
pub enum RerankError {
    /// Model could not be loaded or is not reachable
    Unavailable(String),
    /// Model failed while scoring a batch
    Prediction(String),
    /// Model returned a score vector of the wrong length
    ShapeMismatch {
        /// Number of pairs sent
        expected: usize,
        /// Number of scores received
        actual: usize,
    },
}

impl fmt::Display for RerankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RerankError::Unavailable(msg) => write!(f, "model unavailable: {}", msg),
            RerankError::Prediction(msg) => write!(f, "prediction error: {}", msg),
            RerankError::ShapeMismatch { expected, actual } => write!(
                f,
                "score vector length {} does not match {} pairs",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for RerankError {}
