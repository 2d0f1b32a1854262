//! Phrase normalization and tokenization shared by the index and the scorer.

use std::collections::BTreeSet;

/// Filler words dropped before token-overlap comparison. Includes the common
/// praise words people put in front of a skill ("good with", "excellent at").
const STOP_WORDS: &[&str] = &[
    "a", "about", "am", "an", "and", "are", "at", "be", "been", "but", "by", "can", "could",
    "did", "do", "does", "during", "excellent", "for", "from", "good", "great", "had", "has",
    "have", "how", "i", "in", "into", "is", "may", "might", "must", "of", "on", "or", "really",
    "should", "strong", "that", "the", "these", "this", "those", "through", "to", "up", "very",
    "was", "well", "were", "what", "when", "where", "which", "who", "whom", "why", "will",
    "with", "would",
];

/// Lowercases, trims and collapses internal whitespace. Idempotent.
pub fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Alphanumeric words of a phrase, in order, without stop words.
pub fn content_tokens(phrase: &str) -> Vec<String> {
    phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Distinct content tokens, used for set comparison.
pub fn token_set(phrase: &str) -> BTreeSet<String> {
    content_tokens(phrase).into_iter().collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// |a ∩ b| / |a ∪ b|; 0.0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let shared = small.iter().filter(|t| large.contains(*t)).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 0.0;
    }
    shared as f64 / union as f64
}
