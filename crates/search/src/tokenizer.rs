//! Domain-aware tokenizer shared by indexing and querying
//!
//! Pipeline: lowercase → isolate section numbers → extract alphanumeric runs
//!           → drop stopwords (unless preserved)
//!
//! Lowercasing comes first so a term tokenizes the same whatever its case:
//! `AC-2` and `ac-2` both yield `ac-2`. ALL-CAPS acronyms such as `NIST`
//! therefore come out as ordinary lowercase words.
//!
//! Indexing and retrieval MUST go through the same function, otherwise the
//! IDF and term-frequency statistics stop describing the queries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Generic English words carrying little discriminative value.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "also", "an", "and", "any", "are", "as", "at", "back", "be",
    "because", "been", "but", "by", "can", "day", "each", "even", "first", "for", "from",
    "give", "had", "has", "have", "he", "her", "how", "if", "in", "is", "it", "its", "many",
    "most", "my", "new", "no", "of", "on", "only", "our", "out", "over", "said", "so", "some",
    "that", "the", "their", "them", "then", "these", "they", "think", "this", "time", "to",
    "two", "up", "us", "use", "want", "was", "way", "well", "what", "when", "which", "will",
    "with", "work", "would",
];

/// Technical vocabulary that is never filtered, even if it looks generic.
const PRESERVED_TERMS: &[&str] = &[
    "access", "assessment", "audit", "authentication", "authorization", "backup", "breach",
    "compliance", "control", "data", "encryption", "framework", "guidelines", "incident",
    "monitoring", "policy", "privacy", "procedure", "recovery", "requirement", "response",
    "risk", "security", "standard", "system", "threat", "vulnerability",
];

static SECTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+\.\d+(?:\.\d+)*)\b").expect("valid section regex"));

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-zA-Z0-9][a-zA-Z0-9._-]*[a-zA-Z0-9]\b|\b[a-zA-Z0-9]\b")
        .expect("valid token regex")
});

#[inline]
fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Whether a term is on the domain-preservation list.
#[inline]
pub fn is_preserved(token: &str) -> bool {
    PRESERVED_TERMS.binary_search(&token).is_ok()
}

fn keep(token: &str) -> bool {
    if is_preserved(token) {
        return true;
    }
    if token.len() == 1 {
        return token.bytes().all(|b| b.is_ascii_digit());
    }
    !is_stopword(token)
}

/// Tokenize text into searchable terms.
///
/// 1. Lowercase
/// 2. Surround section numbers such as `4.2.1` with spaces
/// 3. Extract alphanumeric runs allowing internal `.`, `_`, `-`
/// 4. Keep preserved domain terms, single digits, and non-stopwords of length ≥ 2
///
/// Pure function: the same input always yields the same sequence.
///
/// # Example
///
/// ```
/// use cyberrag_search::tokenizer::tokenize;
///
/// let tokens = tokenize("NIST requires CC6.1 access control");
/// assert_eq!(tokens, vec!["nist", "requires", "cc6.1", "access", "control"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let spaced = SECTION_NUMBER.replace_all(&lowered, " $1 ");

    TOKEN
        .find_iter(&spaced)
        .map(|m| m.as_str())
        .filter(|t| keep(t))
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, preserving first-seen order.
///
/// # Example
///
/// ```
/// use cyberrag_search::tokenizer::tokenize_unique;
///
/// let tokens = tokenize_unique("audit AUDIT Audit");
/// assert_eq!(tokens, vec!["audit"]);
/// ```
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
