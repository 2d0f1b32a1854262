use serde::{Deserialize, Serialize};

/// One entry of the O*NET skill taxonomy. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub related_terms: Vec<String>,
}

/// Aggregate counts over a loaded taxonomy and its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyStats {
    pub skills_count: usize,
    pub index_keys: usize,
    pub index_entries: usize,
    pub skipped_rows: usize,
}
