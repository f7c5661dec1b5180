//! Query enhancement
//!
//! Extracts domain signals from a free-text query: technical keywords,
//! section numbers and mentioned compliance frameworks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TECHNICAL_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:control|requirement|standard|policy|procedure|security|compliance|audit|risk|assessment|framework|guideline|directive|access|authentication|authorization|encryption|backup|recovery|incident|response|vulnerability|threat|monitoring|logging)\b",
    )
    .expect("valid technical term regex")
});

static SECTION_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.\d+(?:\.\d+)*\b").expect("valid section regex"));

/// Framework tags and the patterns that detect them, in reporting order.
static FRAMEWORK_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("nist", r"(?i)\b(?:nist|national institute)\b"),
        ("soc", r"(?i)\bsoc\s*2?\b"),
        ("pci", r"(?i)\b(?:pci|payment card)\b"),
        ("hipaa", r"(?i)\bhipaa\b"),
        ("gdpr", r"(?i)\bgdpr\b"),
        ("iso", r"(?i)\biso\s*\d+\b"),
        ("cmmc", r"(?i)\bcmmc\b"),
        ("fedramp", r"(?i)\bfedramp\b"),
    ]
    .into_iter()
    .map(|(tag, pattern)| (tag, Regex::new(pattern).expect("valid framework regex")))
    .collect()
});

/// Domain signals extracted from a query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnhancedQuery {
    /// Query as given
    pub original: String,
    /// Lowercased query
    pub processed: String,
    /// Technical terms (lowercased, in order of appearance) followed by section numbers
    pub keywords: Vec<String>,
    /// Detected framework tags
    pub frameworks: Vec<String>,
    /// Reserved for concept expansion; always empty
    pub concepts: Vec<String>,
}

/// Extract keywords, section numbers and framework mentions from a query.
pub fn enhance_query(query: &str) -> EnhancedQuery {
    let mut keywords: Vec<String> = TECHNICAL_TERM
        .find_iter(query)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    keywords.extend(SECTION_REF.find_iter(query).map(|m| m.as_str().to_string()));

    let frameworks = FRAMEWORK_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(query))
        .map(|(tag, _)| tag.to_string())
        .collect();

    EnhancedQuery {
        original: query.to_string(),
        processed: query.to_lowercase(),
        keywords,
        frameworks,
        concepts: Vec::new(),
    }
}
