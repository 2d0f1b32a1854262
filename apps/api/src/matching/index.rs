//! Synonym Index: normalized phrase/token → weighted candidate skills.
//!
//! Derivations per skill record:
//! - canonical name → weight 1.0
//! - curated synonym → weight 0.9
//! - related term → weight 0.8
//! - name token (multi-word names, tokens of ≥ 4 chars) → weight 0.5
//!
//! A phrase reached through several derivations for the same skill keeps the
//! highest weight. On a curated phrase, name-token entries for skills the
//! curation does not name are dropped. Keys and entries are kept in sorted
//! order so two builds from the same inputs are identical.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::matching::normalize::{content_tokens, normalize, token_set};
use crate::taxonomy::{CuratedSynonyms, Taxonomy};

pub const CANONICAL_WEIGHT: f64 = 1.0;
pub const CURATED_WEIGHT: f64 = 0.9;
pub const RELATED_TERM_WEIGHT: f64 = 0.8;
pub const NAME_TOKEN_WEIGHT: f64 = 0.5;
pub const MIN_NAME_TOKEN_CHARS: usize = 4;

/// Which derivation produced an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    CanonicalName,
    Curated,
    RelatedTerm,
    NameToken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub skill_id: String,
    pub weight: f64,
    pub source: EntrySource,
}

/// One index key: its content tokens (precomputed for overlap scoring) and
/// the skills it points at, sorted by skill id.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexKey {
    pub tokens: BTreeSet<String>,
    pub entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynonymIndex {
    keys: BTreeMap<String, IndexKey>,
}

impl SynonymIndex {
    /// Builds the index from every taxonomy record plus optional curated synonyms.
    pub fn build(taxonomy: &Taxonomy, curated: Option<&CuratedSynonyms>) -> Self {
        let mut builder = IndexBuilder::default();

        for record in taxonomy.records() {
            let name = normalize(&record.name);
            builder.add(
                &name,
                &record.id,
                CANONICAL_WEIGHT,
                EntrySource::CanonicalName,
            );

            for term in &record.related_terms {
                builder.add(
                    &normalize(term),
                    &record.id,
                    RELATED_TERM_WEIGHT,
                    EntrySource::RelatedTerm,
                );
            }

            if name.split(' ').count() > 1 {
                for token in content_tokens(&name) {
                    if token.chars().count() >= MIN_NAME_TOKEN_CHARS {
                        builder.add(
                            &token,
                            &record.id,
                            NAME_TOKEN_WEIGHT,
                            EntrySource::NameToken,
                        );
                    }
                }
            }
        }

        let mut curated_keys: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for synonym in curated.into_iter().flat_map(|c| c.iter()) {
            let phrase = normalize(&synonym.phrase);
            if phrase.is_empty() {
                warn!("Skipping curated synonym with blank phrase");
                continue;
            }
            if !taxonomy.contains(&synonym.skill_id) {
                warn!(
                    "Skipping curated synonym '{}': unknown skill id '{}'",
                    phrase, synonym.skill_id
                );
                continue;
            }
            builder.add(
                &phrase,
                &synonym.skill_id,
                CURATED_WEIGHT,
                EntrySource::Curated,
            );
            curated_keys
                .entry(phrase)
                .or_default()
                .insert(synonym.skill_id.clone());
        }

        for (phrase, curated_ids) in &curated_keys {
            if let Some(entries) = builder.keys.get_mut(phrase) {
                entries.retain(|skill_id, (_, source)| {
                    *source != EntrySource::NameToken || curated_ids.contains(skill_id)
                });
            }
        }

        let index = builder.finish();
        info!(
            "Built synonym index: {} keys, {} entries",
            index.len(),
            index.entry_count()
        );
        index
    }

    pub fn get(&self, key: &str) -> Option<&IndexKey> {
        self.keys.get(key)
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexKey)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.keys.values().map(|k| k.entries.len()).sum()
    }
}

#[derive(Default)]
struct IndexBuilder {
    keys: BTreeMap<String, BTreeMap<String, (f64, EntrySource)>>,
}

impl IndexBuilder {
    fn add(&mut self, phrase: &str, skill_id: &str, weight: f64, source: EntrySource) {
        if phrase.is_empty() {
            return;
        }
        let slot = self
            .keys
            .entry(phrase.to_string())
            .or_default()
            .entry(skill_id.to_string())
            .or_insert((weight, source));
        if weight > slot.0 {
            *slot = (weight, source);
        }
    }

    fn finish(self) -> SynonymIndex {
        let keys = self
            .keys
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(phrase, entries)| {
                let key = IndexKey {
                    tokens: token_set(&phrase),
                    entries: entries
                        .into_iter()
                        .map(|(skill_id, (weight, source))| IndexEntry {
                            skill_id,
                            weight,
                            source,
                        })
                        .collect(),
                };
                (phrase, key)
            })
            .collect();
        SynonymIndex { keys }
    }
}
