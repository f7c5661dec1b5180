//! Retrieval configuration via `cyberrag.toml`
//!
//! Every tunable of the index, the fusion layer and the reranker lives in one
//! explicit struct. Components receive their section by value at construction;
//! nothing reads configuration from ambient global state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name conventionally placed next to the index directory.
pub const CONFIG_FILE_NAME: &str = "cyberrag.toml";

// ============================================================================
// BM25 parameters
// ============================================================================

/// Parameters of the lexical BM25 index.
///
/// Fixed at index construction and never changed afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation (default 1.2)
    #[serde(default = "default_k1")]
    pub k1: f64,
    /// Length-normalization strength (default 0.75)
    #[serde(default = "default_b")]
    pub b: f64,
    /// IDF floor for terms present in the index (default 0.25)
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_k1() -> f64 {
    1.2
}

fn default_b() -> f64 {
    0.75
}

fn default_epsilon() -> f64 {
    0.25
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params {
            k1: default_k1(),
            b: default_b(),
            epsilon: default_epsilon(),
        }
    }
}

impl Bm25Params {
    /// Create parameters with explicit values
    pub fn new(k1: f64, b: f64, epsilon: f64) -> Self {
        Bm25Params { k1, b, epsilon }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::configuration(format!(
                "bm25.k1 must be a non-negative number, got {}",
                self.k1
            )));
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(Error::configuration(format!(
                "bm25.b must be within [0, 1], got {}",
                self.b
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::configuration(format!(
                "bm25.epsilon must be a non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Fusion
// ============================================================================

/// Strategy used to merge the semantic and lexical rankings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FusionMethod {
    /// Reciprocal Rank Fusion (default)
    #[default]
    Rrf,
    /// Normalized score fusion with configurable weights
    Weighted,
}

impl FusionMethod {
    /// Name used in configuration files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionMethod::Rrf => "rrf",
            FusionMethod::Weighted => "weighted",
        }
    }
}

/// Configuration of the fusion layer and the hybrid retriever.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusionConfig {
    /// Fusion strategy (default "rrf")
    #[serde(default)]
    pub method: FusionMethod,
    /// RRF smoothing constant (default 60)
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
    /// Weight of the semantic signal in weighted fusion (default 0.6)
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,
    /// Weight of the lexical signal in weighted fusion (default 0.4)
    #[serde(default = "default_bm25_weight")]
    pub bm25_weight: f64,
    /// Each source is asked for `candidate_multiplier × n_results` candidates (default 2)
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,
}

fn default_rrf_k() -> u32 {
    60
}

fn default_semantic_weight() -> f64 {
    0.6
}

fn default_bm25_weight() -> f64 {
    0.4
}

fn default_candidate_multiplier() -> usize {
    2
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            method: FusionMethod::default(),
            rrf_k: default_rrf_k(),
            semantic_weight: default_semantic_weight(),
            bm25_weight: default_bm25_weight(),
            candidate_multiplier: default_candidate_multiplier(),
        }
    }
}

impl FusionConfig {
    /// Check parameter ranges
    ///
    /// Weights are not renormalized here; callers are expected to supply
    /// weights that already sum to 1.
    pub fn validate(&self) -> Result<()> {
        if self.rrf_k == 0 {
            return Err(Error::configuration("fusion.rrf_k must be positive"));
        }
        for (name, weight) in [
            ("semantic_weight", self.semantic_weight),
            ("bm25_weight", self.bm25_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::configuration(format!(
                    "fusion.{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if self.candidate_multiplier == 0 {
            return Err(Error::configuration(
                "fusion.candidate_multiplier must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Reranking
// ============================================================================

/// Configuration of the cross-encoder reranker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankConfig {
    /// Whether the pipeline applies reranking (default true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pairs per model call (default 32)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Minimum rerank score kept by the relevance filter (default 0.3)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Passage truncation limit in characters (default 512)
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Query truncation limit in characters (default 200)
    #[serde(default = "default_query_max_length")]
    pub query_max_length: usize,
    /// Ceiling on candidates sent to the model (default 50)
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Per-member weights for the ensemble reranker (empty = equal weighting)
    #[serde(default)]
    pub ensemble_weights: Vec<f64>,
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    32
}

fn default_threshold() -> f64 {
    0.3
}

fn default_max_length() -> usize {
    512
}

fn default_query_max_length() -> usize {
    200
}

fn default_max_candidates() -> usize {
    50
}

impl Default for RerankConfig {
    fn default() -> Self {
        RerankConfig {
            enabled: default_true(),
            batch_size: default_batch_size(),
            threshold: default_threshold(),
            max_length: default_max_length(),
            query_max_length: default_query_max_length(),
            max_candidates: default_max_candidates(),
            ensemble_weights: Vec::new(),
        }
    }
}

impl RerankConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::configuration("rerank.batch_size must be at least 1"));
        }
        if self.max_candidates == 0 {
            return Err(Error::configuration(
                "rerank.max_candidates must be at least 1",
            ));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::configuration(format!(
                "rerank.threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        // Room for at least one character plus the ellipsis marker
        if self.max_length < 4 || self.query_max_length < 4 {
            return Err(Error::configuration(
                "rerank.max_length and rerank.query_max_length must be at least 4",
            ));
        }
        validate_ensemble_weights(&self.ensemble_weights)
    }
}

/// Reject non-positive or non-finite ensemble weights.
///
/// An empty weight list is accepted and means equal weighting.
pub fn validate_ensemble_weights(weights: &[f64]) -> Result<()> {
    for (i, w) in weights.iter().enumerate() {
        if !w.is_finite() || *w <= 0.0 {
            return Err(Error::configuration(format!(
                "ensemble weight #{} must be a positive number, got {}",
                i, w
            )));
        }
    }
    Ok(())
}

// ============================================================================
// RetrievalConfig
// ============================================================================

/// Complete retrieval configuration loaded from `cyberrag.toml`.
///
/// # Example
///
/// ```toml
/// default_search_results = 7
///
/// [bm25]
/// k1 = 1.2
///
/// [fusion]
/// method = "weighted"
/// semantic_weight = 0.7
/// bm25_weight = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Results returned by the pipeline when the caller does not ask for a count
    #[serde(default = "default_search_results")]
    pub default_search_results: usize,
    /// Lexical index parameters
    #[serde(default)]
    pub bm25: Bm25Params,
    /// Fusion parameters
    #[serde(default)]
    pub fusion: FusionConfig,
    /// Reranker parameters
    #[serde(default)]
    pub rerank: RerankConfig,
}

fn default_search_results() -> usize {
    7
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            default_search_results: default_search_results(),
            bm25: Bm25Params::default(),
            fusion: FusionConfig::default(),
            rerank: RerankConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.default_search_results == 0 {
            return Err(Error::configuration(
                "default_search_results must be at least 1",
            ));
        }
        self.bm25.validate()?;
        self.fusion.validate()?;
        self.rerank.validate()
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# cyberrag retrieval configuration

# Results returned when the caller does not specify a count
default_search_results = 7

[bm25]
k1 = 1.2          # term-frequency saturation
b = 0.75          # length normalization strength
epsilon = 0.25    # IDF floor for indexed terms

[fusion]
method = "rrf"            # "rrf" or "weighted"
rrf_k = 60                # RRF smoothing constant
semantic_weight = 0.6     # weighted fusion only; weights should sum to 1
bm25_weight = 0.4
candidate_multiplier = 2  # candidates requested per source = multiplier x n_results

[rerank]
enabled = true
batch_size = 32
threshold = 0.3
max_length = 512          # passage characters
query_max_length = 200    # query characters
max_candidates = 50
# ensemble_weights = [1.0, 0.5]
"#
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RetrievalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Configuration(msg) => Error::Configuration(format!(
                "config file '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
