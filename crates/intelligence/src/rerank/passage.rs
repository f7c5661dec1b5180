//! Query/passage pair construction for cross-encoder input
//!
//! A passage is the candidate text prefixed with its framework tag and any
//! section/subsection titles, then truncated to the model's input budget:
//!
//! ```text
//! Section: Access Control | Subsection: AC-2
//! [NIST] Manage information system accounts ...
//! ```

use cyberrag_core::SearchResult;

/// Truncate to at most `max_chars` characters.
///
/// Prefers to cut right after a `.` found in the last 30% of the window;
/// otherwise keeps the first `max_chars - 3` characters followed by `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let window = &text[..byte_offset(text, max_chars)];
    if let Some(dot) = window.rfind('.') {
        let dot_chars = window[..dot].chars().count();
        if dot_chars as f64 > max_chars as f64 * 0.7 {
            return window[..=dot].to_string();
        }
    }

    let hard = byte_offset(text, max_chars.saturating_sub(3));
    format!("{}...", &text[..hard])
}

/// Byte offset of the `n`-th character (or the end of the string).
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Passage text for one candidate, before truncation.
pub fn passage_text(result: &SearchResult) -> String {
    let mut passage = if result.framework.is_empty() {
        result.text.clone()
    } else {
        format!("[{}] {}", result.framework, result.text)
    };

    let mut context = Vec::with_capacity(2);
    if let Some(section) = result.section_title() {
        context.push(format!("Section: {}", section));
    }
    if let Some(subsection) = result.subsection_title() {
        context.push(format!("Subsection: {}", subsection));
    }
    if !context.is_empty() {
        passage = format!("{}\n{}", context.join(" | "), passage);
    }
    passage
}

/// Build one (query, passage) pair per candidate.
pub fn build_pairs(
    query: &str,
    candidates: &[SearchResult],
    max_length: usize,
    query_max_length: usize,
) -> Vec<(String, String)> {
    let query = truncate_text(query, query_max_length);
    candidates
        .iter()
        .map(|result| {
            (
                query.clone(),
                truncate_text(&passage_text(result), max_length),
            )
        })
        .collect()
}
