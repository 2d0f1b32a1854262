//! Match Scorer: grades one normalized phrase against one index key.
//!
//! Strategies, strongest first:
//! 1. Exact  : phrase equals the key → factor 1.0
//! 2. Synonym: Jaccard overlap of content tokens ≥ `token_overlap` → factor = overlap
//! 3. Fuzzy  : 1 − levenshtein / longer length ≥ `fuzzy_similarity` → factor = similarity
//!
//! The candidate score is `factor × entry weight`, so an exact hit on the
//! canonical name scores 1.0 and an exact hit on a related term scores 0.8.
//! Scoring is pure: the same inputs always produce the same candidate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matching::index::{IndexEntry, IndexKey};
use crate::matching::normalize::{normalize, token_set};
use crate::models::{MatchCandidate, MatchType};

/// Tunable thresholds for matching and ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Minimum Jaccard token overlap for a Synonym match.
    pub token_overlap: f64,
    /// Minimum edit-distance similarity for a Fuzzy match.
    pub fuzzy_similarity: f64,
    /// Candidates scoring below this are never returned.
    pub min_score: f64,
    /// Upper bound on results per phrase.
    pub max_results: usize,
    /// Index the built-in curated phrasings of the standard O*NET skills.
    pub builtin_synonyms: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            token_overlap: 0.5,
            fuzzy_similarity: 0.6,
            min_score: 0.3,
            max_results: 10,
            builtin_synonyms: true,
        }
    }
}

/// A phrase prepared once for scoring against every key.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPhrase {
    pub normalized: String,
    pub tokens: BTreeSet<String>,
    /// Length of `normalized` in characters.
    pub len: usize,
}

impl PreparedPhrase {
    pub fn new(phrase: &str) -> Self {
        let normalized = normalize(phrase);
        let tokens = token_set(&normalized);
        let len = normalized.chars().count();
        Self {
            normalized,
            tokens,
            len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// How well a phrase matches a key, before the entry weight is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMatch {
    pub match_type: MatchType,
    pub factor: f64,
}

/// Grades a phrase against a key. `None` when no strategy clears its threshold.
pub fn match_key(
    phrase: &PreparedPhrase,
    key: &str,
    key_index: &IndexKey,
    config: &MatcherConfig,
) -> Option<KeyMatch> {
    if phrase.is_empty() {
        return None;
    }

    if phrase.normalized == key {
        return Some(KeyMatch {
            match_type: MatchType::Exact,
            factor: 1.0,
        });
    }

    let overlap = token_overlap(&phrase.tokens, &key_index.tokens);
    if overlap > 0.0 && overlap >= config.token_overlap {
        return Some(KeyMatch {
            match_type: MatchType::Synonym,
            factor: overlap,
        });
    }

    // Edit distance is at least the length difference, so skip keys that
    // cannot reach the threshold before running the quadratic comparison.
    let key_len = key.chars().count();
    let longest = phrase.len.max(key_len);
    let best_possible = 1.0 - phrase.len.abs_diff(key_len) as f64 / longest as f64;
    if best_possible < config.fuzzy_similarity {
        return None;
    }

    let similarity = edit_similarity(&phrase.normalized, key);
    if similarity >= config.fuzzy_similarity {
        return Some(KeyMatch {
            match_type: MatchType::Fuzzy,
            factor: similarity,
        });
    }

    None
}

/// Applies a key-level match to one of the key's entries.
pub fn score_entry(key_match: KeyMatch, entry: &IndexEntry) -> MatchCandidate {
    MatchCandidate {
        skill_id: entry.skill_id.clone(),
        score: (key_match.factor * entry.weight).clamp(0.0, 1.0),
        match_type: key_match.match_type,
    }
}

/// Jaccard overlap of two token sets; 0.0 when both are empty.
pub fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    crate::matching::normalize::jaccard(a, b)
}

/// 1 − (levenshtein distance / length of the longer string), in characters.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(a, b) as f64 / longest as f64
}
