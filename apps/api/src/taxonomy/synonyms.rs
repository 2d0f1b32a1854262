//! Curated synonym table: colloquial phrase → taxonomy skill id.
//!
//! Two sources feed it: a JSON object supplied by the operator
//! (`{"people skills": "2.B.1.a"}`) and a built-in table of everyday phrasings
//! for the standard O*NET skills, keyed by canonical skill name and resolved to
//! ids against whatever taxonomy was loaded.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::taxonomy::loader::{Taxonomy, TaxonomyError};

/// Everyday phrasings for the standard O*NET skills, keyed by canonical name.
pub const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("Active Listening", &["listening", "hearing", "attention"]),
    (
        "Critical Thinking",
        &["analysis", "reasoning", "problem solving"],
    ),
    (
        "Reading Comprehension",
        &["reading", "comprehension", "understanding"],
    ),
    ("Writing", &["composition", "documentation", "reporting"]),
    ("Speaking", &["communication", "presentation", "verbal"]),
    ("Mathematics", &["math", "numerical", "calculation"]),
    ("Science", &["scientific", "research", "investigation"]),
    (
        "Learning Strategies",
        &["learning", "education", "training"],
    ),
    ("Monitoring", &["oversight", "supervision", "tracking"]),
    (
        "Social Perceptiveness",
        &["empathy", "social awareness", "people skills"],
    ),
    ("Coordination", &["organization", "management", "planning"]),
    ("Persuasion", &["influence", "negotiation", "convincing"]),
    ("Negotiation", &["bargaining", "mediation", "compromise"]),
    ("Instructing", &["teaching", "training", "education"]),
    (
        "Service Orientation",
        &["customer service", "helpfulness", "support"],
    ),
    (
        "Complex Problem Solving",
        &["problem solving", "analysis", "troubleshooting"],
    ),
    (
        "Operations Analysis",
        &["process analysis", "workflow", "operations"],
    ),
    (
        "Technology Design",
        &["system design", "engineering", "development"],
    ),
    (
        "Equipment Selection",
        &["procurement", "selection", "evaluation"],
    ),
    ("Installation", &["setup", "implementation", "deployment"]),
    ("Programming", &["coding", "development", "software"]),
    (
        "Quality Control Analysis",
        &["testing", "validation", "quality assurance"],
    ),
    (
        "Operations Monitoring",
        &["monitoring", "oversight", "surveillance"],
    ),
    (
        "Operation and Control",
        &["operation", "control", "management"],
    ),
    (
        "Equipment Maintenance",
        &["maintenance", "repair", "servicing"],
    ),
    (
        "Troubleshooting",
        &["debugging", "problem solving", "diagnosis"],
    ),
    ("Repairing", &["fixing", "maintenance", "restoration"]),
    (
        "Judgment and Decision Making",
        &["decision making", "judgment", "evaluation"],
    ),
    (
        "Systems Analysis",
        &["analysis", "evaluation", "assessment"],
    ),
    (
        "Systems Evaluation",
        &["evaluation", "assessment", "review"],
    ),
    (
        "Time Management",
        &["scheduling", "planning", "organization"],
    ),
    (
        "Management of Financial Resources",
        &["budgeting", "financial management", "accounting"],
    ),
    (
        "Management of Material Resources",
        &["inventory", "resource management", "logistics"],
    ),
    (
        "Management of Personnel Resources",
        &["hr", "people management", "staffing"],
    ),
];

/// One curated pairing. A phrase may point at several skills.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CuratedSynonym {
    pub phrase: String,
    pub skill_id: String,
}

/// Ordered, de-duplicated set of curated phrase → skill id pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuratedSynonyms {
    entries: Vec<CuratedSynonym>,
}

impl CuratedSynonyms {
    pub fn from_pairs<I, P, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
    {
        let mut synonyms = Self::default();
        for (phrase, skill_id) in pairs {
            synonyms.push(phrase.into(), skill_id.into());
        }
        synonyms
    }

    /// Parses a JSON object of `phrase → skill id` strings.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, TaxonomyError> {
        let table: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        Ok(Self::from_pairs(table))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TaxonomyError> {
        let file = File::open(path)?;
        Self::from_json(file)
    }

    /// Resolves `BUILTIN_SYNONYMS` against the loaded taxonomy by skill name.
    /// Skills the taxonomy does not carry are left out.
    pub fn builtin(taxonomy: &Taxonomy) -> Self {
        let mut synonyms = Self::default();
        for (name, phrases) in BUILTIN_SYNONYMS {
            let Some(skill) = taxonomy.find_by_name(name) else {
                debug!("Built-in synonyms for '{name}' unused: skill not in taxonomy");
                continue;
            };
            for phrase in *phrases {
                synonyms.push(phrase.to_string(), skill.id.clone());
            }
        }
        synonyms
    }

    /// Adds every pair of `other` that is not already present.
    pub fn merge(&mut self, other: &CuratedSynonyms) {
        for entry in &other.entries {
            self.push(entry.phrase.clone(), entry.skill_id.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CuratedSynonym> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, phrase: String, skill_id: String) {
        let entry = CuratedSynonym { phrase, skill_id };
        if let Err(pos) = self.entries.binary_search(&entry) {
            self.entries.insert(pos, entry);
        }
    }
}
