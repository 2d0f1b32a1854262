//! Skill Mapper: the public entry point.
//!
//! A mapper starts not-ready. `initialize` loads the taxonomy, builds the
//! synonym index and swaps in an immutable snapshot; from then on every call is
//! read-only, so a mapper can be cloned and shared across threads freely.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::matching::index::SynonymIndex;
use crate::matching::scorer::{match_key, score_entry, MatcherConfig, PreparedPhrase};
use crate::models::{MappedSkill, MatchCandidate, SkillMapping, SkillRecord, TaxonomyStats};
use crate::taxonomy::{load_taxonomy, CuratedSynonyms, LoadReport, Taxonomy, TaxonomyError};

#[derive(Debug, Error, PartialEq)]
pub enum MapperError {
    #[error("Skill mapper is not initialized")]
    NotReady,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Everything a ready mapper reads from. Never mutated after construction.
#[derive(Debug)]
struct Snapshot {
    taxonomy: Taxonomy,
    index: SynonymIndex,
    report: LoadReport,
}

#[derive(Debug, Clone, Default)]
enum MapperState {
    #[default]
    NotReady,
    Ready(Arc<Snapshot>),
}

/// Result page of a taxonomy search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSearch {
    pub skills: Vec<SkillRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SkillMapper {
    config: MatcherConfig,
    state: MapperState,
}

impl SkillMapper {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            state: MapperState::NotReady,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, MapperState::Ready(_))
    }

    /// Loads the taxonomy from `source` and builds the index. On failure the
    /// mapper keeps its previous state.
    pub fn initialize<R: Read>(
        &mut self,
        source: R,
        synonyms: Option<&CuratedSynonyms>,
    ) -> Result<LoadReport, TaxonomyError> {
        let (taxonomy, report) = load_taxonomy(source)?;

        let mut curated = if self.config.builtin_synonyms {
            CuratedSynonyms::builtin(&taxonomy)
        } else {
            CuratedSynonyms::default()
        };
        if let Some(extra) = synonyms {
            curated.merge(extra);
        }

        let index = SynonymIndex::build(&taxonomy, Some(&curated));
        info!(
            "Skill mapper ready: {} skills, {} index keys",
            taxonomy.len(),
            index.len()
        );

        self.state = MapperState::Ready(Arc::new(Snapshot {
            taxonomy,
            index,
            report: report.clone(),
        }));
        Ok(report)
    }

    /// `initialize` from files on disk.
    pub fn initialize_from_paths(
        &mut self,
        taxonomy_path: &Path,
        synonyms_path: Option<&Path>,
    ) -> Result<LoadReport, TaxonomyError> {
        let synonyms = synonyms_path
            .map(CuratedSynonyms::from_json_file)
            .transpose()?;
        let file = std::fs::File::open(taxonomy_path)?;
        self.initialize(file, synonyms.as_ref())
    }

    /// Maps each phrase to ranked taxonomy skills, one `SkillMapping` per
    /// phrase in input order.
    pub fn map_user_skills<S: AsRef<str>>(
        &self,
        phrases: &[S],
    ) -> Result<Vec<SkillMapping>, MapperError> {
        let snapshot = self.snapshot()?;
        Ok(phrases
            .iter()
            .map(|p| self.map_phrase(snapshot, p.as_ref()))
            .collect())
    }

    /// Like `map_user_skills`, for untyped input: `value` must be an array of strings.
    pub fn map_json_phrases(&self, value: &Value) -> Result<Vec<SkillMapping>, MapperError> {
        let phrases = phrases_from_json(value)?;
        self.map_user_skills(phrases.as_slice())
    }

    pub fn get_skill(&self, id: &str) -> Result<Option<&SkillRecord>, MapperError> {
        Ok(self.snapshot()?.taxonomy.get(id))
    }

    /// Case-insensitive substring search over skill names and descriptions.
    /// Exact name matches rank first, then by name, then by id. A blank query
    /// lists the whole taxonomy in load order.
    pub fn search_skills(&self, query: &str, limit: usize) -> Result<SkillSearch, MapperError> {
        let taxonomy = &self.snapshot()?.taxonomy;
        let query = query.trim().to_lowercase();

        let mut matches: Vec<&SkillRecord> = if query.is_empty() {
            taxonomy.records().iter().collect()
        } else {
            let mut found: Vec<&SkillRecord> = taxonomy
                .records()
                .iter()
                .filter(|r| {
                    r.name.to_lowercase().contains(&query)
                        || r.description.to_lowercase().contains(&query)
                })
                .collect();
            found.sort_by(|a, b| {
                let a_partial = a.name.to_lowercase() != query;
                let b_partial = b.name.to_lowercase() != query;
                a_partial
                    .cmp(&b_partial)
                    .then_with(|| a.name.cmp(&b.name))
                    .then_with(|| a.id.cmp(&b.id))
            });
            found
        };

        let total = matches.len();
        matches.truncate(limit);
        Ok(SkillSearch {
            skills: matches.into_iter().cloned().collect(),
            total,
        })
    }

    pub fn stats(&self) -> Result<TaxonomyStats, MapperError> {
        let snapshot = self.snapshot()?;
        Ok(TaxonomyStats {
            skills_count: snapshot.taxonomy.len(),
            index_keys: snapshot.index.len(),
            index_entries: snapshot.index.entry_count(),
            skipped_rows: snapshot.report.errors.len(),
        })
    }

    pub fn load_report(&self) -> Result<&LoadReport, MapperError> {
        Ok(&self.snapshot()?.report)
    }

    fn snapshot(&self) -> Result<&Snapshot, MapperError> {
        match &self.state {
            MapperState::Ready(snapshot) => Ok(snapshot.as_ref()),
            MapperState::NotReady => Err(MapperError::NotReady),
        }
    }

    fn map_phrase(&self, snapshot: &Snapshot, raw: &str) -> SkillMapping {
        let phrase = PreparedPhrase::new(raw);
        if phrase.is_empty() {
            return SkillMapping {
                input_phrase: raw.to_string(),
                onet_skills: vec![],
            };
        }

        // Best candidate per skill id across every key
        let mut best: BTreeMap<&str, MatchCandidate> = BTreeMap::new();
        for (key, key_index) in snapshot.index.iter() {
            let Some(key_match) = match_key(&phrase, key, key_index, &self.config) else {
                continue;
            };
            for entry in &key_index.entries {
                let candidate = score_entry(key_match, entry);
                let replace = best
                    .get(entry.skill_id.as_str())
                    .map_or(true, |current| candidate.beats(current));
                if replace {
                    best.insert(entry.skill_id.as_str(), candidate);
                }
            }
        }

        let considered = best.len();
        let mut ranked: Vec<MatchCandidate> = best
            .into_values()
            .filter(|c| c.score >= self.config.min_score)
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.skill_id.cmp(&b.skill_id))
        });
        ranked.truncate(self.config.max_results);

        debug!(
            "Mapped '{}': {} candidates, {} returned",
            phrase.normalized,
            considered,
            ranked.len()
        );

        let onet_skills = ranked
            .into_iter()
            .filter_map(|c| {
                let record = snapshot.taxonomy.get(&c.skill_id)?;
                Some(MappedSkill {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    category: record.category.clone(),
                    score: c.score,
                    match_type: c.match_type,
                })
            })
            .collect();

        SkillMapping {
            input_phrase: raw.to_string(),
            onet_skills,
        }
    }
}

/// Extracts phrases from a JSON array of strings.
pub fn phrases_from_json(value: &Value) -> Result<Vec<String>, MapperError> {
    let items = value.as_array().ok_or_else(|| {
        MapperError::InvalidInput("phrases must be an array of strings".to_string())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                MapperError::InvalidInput(format!("phrases[{i}] is not a string"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchType;
    use serde_json::json;

    const ONET_SKILLS: &str = include_str!("../../data/onet_skills.csv");
    const CURATED: &str = include_str!("../../data/curated_synonyms.json");

    fn ready_mapper(config: MatcherConfig) -> SkillMapper {
        let mut mapper = SkillMapper::new(config);
        mapper.initialize(ONET_SKILLS.as_bytes(), None).unwrap();
        mapper
    }

    fn mapper() -> SkillMapper {
        ready_mapper(MatcherConfig::default())
    }

    fn map_one(mapper: &SkillMapper, phrase: &str) -> SkillMapping {
        mapper.map_user_skills(&[phrase]).unwrap().remove(0)
    }

    fn names(mapping: &SkillMapping) -> Vec<&str> {
        mapping.onet_skills.iter().map(|s| &s.name[..]).collect()
    }

    #[test]
    fn test_not_ready_before_initialize() {
        let mapper = SkillMapper::new(MatcherConfig::default());
        assert!(!mapper.is_ready());
        assert_eq!(
            mapper.map_user_skills(&["writing"]).unwrap_err(),
            MapperError::NotReady
        );
        assert_eq!(mapper.stats().unwrap_err(), MapperError::NotReady);
    }

    #[test]
    fn test_failed_initialize_stays_not_ready() {
        let mut mapper = SkillMapper::new(MatcherConfig::default());
        let err = mapper
            .initialize("id,name\n , \n".as_bytes(), None)
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::Empty { .. }));
        assert!(!mapper.is_ready());
    }

    #[test]
    fn test_failed_reinitialize_keeps_previous_snapshot() {
        let mut mapper = mapper();
        assert!(mapper.initialize("no,columns\n".as_bytes(), None).is_err());
        assert!(mapper.is_ready());
        assert_eq!(mapper.stats().unwrap().skills_count, 35);
    }

    #[test]
    fn test_good_with_people_maps_broadly() {
        let mapping = map_one(&mapper(), "good with people");

        assert!(mapping.onet_skills.len() >= 5, "got {:?}", names(&mapping));
        let social = mapping
            .onet_skills
            .iter()
            .find(|s| s.name == "Social Perceptiveness")
            .expect("Social Perceptiveness should be returned");
        assert!(matches!(
            social.match_type,
            MatchType::Synonym | MatchType::Fuzzy
        ));
        assert!(social.score >= 0.3);
        assert_eq!(social.id, "2.B.1.a");
        assert_eq!(social.category, "Social Skills");
    }

    #[test]
    fn test_exact_name_ranks_first() {
        let mapping = map_one(&mapper(), "Critical Thinking");
        let top = &mapping.onet_skills[0];
        assert_eq!(top.name, "Critical Thinking");
        assert_eq!(top.match_type, MatchType::Exact);
        assert_eq!(top.score, 1.0);
    }

    #[test]
    fn test_exact_name_beats_curated_exact_on_other_skill() {
        // "monitoring" is both a skill name and a curated phrase for Operations Monitoring
        let mapping = map_one(&mapper(), "monitoring");
        assert_eq!(mapping.onet_skills[0].name, "Monitoring");
        assert_eq!(mapping.onet_skills[0].score, 1.0);
        assert_eq!(mapping.onet_skills[1].name, "Operations Monitoring");
        assert_eq!(mapping.onet_skills[1].match_type, MatchType::Exact);
        assert!((mapping.onet_skills[1].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_related_term_exact_match() {
        let mapping = map_one(&mapper(), "Quick  Learner");
        assert_eq!(names(&mapping), vec!["Active Learning"]);
        assert_eq!(mapping.onet_skills[0].match_type, MatchType::Exact);
        assert!((mapping.onet_skills[0].score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_typo_maps_fuzzily() {
        let mapping = map_one(&mapper(), "troubleshootng");
        assert_eq!(mapping.onet_skills[0].name, "Troubleshooting");
        assert_eq!(mapping.onet_skills[0].match_type, MatchType::Fuzzy);
    }

    #[test]
    fn test_empty_phrase_yields_empty_mapping() {
        let mappings = mapper().map_user_skills(&["", "   "]).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].input_phrase, "");
        assert!(mappings[0].onet_skills.is_empty());
        assert!(mappings[1].onet_skills.is_empty());
    }

    #[test]
    fn test_unmatched_phrase_yields_empty_mapping() {
        let mapping = map_one(&mapper(), "xyzzy qwerty");
        assert!(mapping.onet_skills.is_empty());
    }

    #[test]
    fn test_one_mapping_per_phrase_in_input_order() {
        let phrases = vec!["sales".to_string(), "".to_string(), "budgeting".to_string()];
        let mappings = mapper().map_user_skills(phrases.as_slice()).unwrap();
        let inputs: Vec<_> = mappings.iter().map(|m| m.input_phrase.as_str()).collect();
        assert_eq!(inputs, vec!["sales", "", "budgeting"]);
        assert_eq!(mappings[0].onet_skills[0].name, "Persuasion");
        assert_eq!(
            mappings[2].onet_skills[0].name,
            "Management of Financial Resources"
        );
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let a = mapper();
        let b = mapper();
        let phrases = ["good with people", "management", "monitoring", "repair"];
        assert_eq!(
            a.map_user_skills(&phrases).unwrap(),
            a.map_user_skills(&phrases).unwrap()
        );
        assert_eq!(
            a.map_user_skills(&phrases).unwrap(),
            b.map_user_skills(&phrases).unwrap()
        );
    }

    #[test]
    fn test_different_phrases_give_different_results() {
        let mapper = mapper();
        let people = map_one(&mapper, "good with people");
        let sheets = map_one(&mapper, "excellent at spreadsheets");
        assert_ne!(people.onet_skills, sheets.onet_skills);
        assert!(names(&sheets).contains(&"Mathematics"));
        assert!(!names(&sheets).contains(&"Social Perceptiveness"));
    }

    #[test]
    fn test_results_sorted_bounded_and_unique() {
        let mapper = mapper();
        let phrases = [
            "good with people",
            "management",
            "monitoring",
            "problem solving",
            "analysis",
            "team leadership",
            "public speaking and writing",
            "fixing cars",
            "planning",
        ];
        for mapping in mapper.map_user_skills(&phrases).unwrap() {
            let phrase = &mapping.input_phrase;
            let skills = &mapping.onet_skills;
            assert!(skills.len() <= 10);
            for pair in skills.windows(2) {
                assert!(pair[0].score >= pair[1].score, "{phrase}: not sorted");
                if pair[0].score == pair[1].score {
                    assert!(pair[0].id < pair[1].id, "{phrase}: tie not by id");
                }
            }
            for skill in skills {
                assert!(skill.score >= 0.3 && skill.score <= 1.0);
            }
            let mut ids: Vec<_> = skills.iter().map(|s| s.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), skills.len(), "{phrase}: duplicate ids");
        }
    }

    #[test]
    fn test_ties_broken_by_ascending_id() {
        let mapping = map_one(&mapper(), "management");
        let ids: Vec<_> = mapping.onet_skills.iter().map(|s| s.id.as_str()).collect();
        let joined = ids.join(" ");
        assert_eq!(joined, "2.B.1.b 2.B.3.h 2.B.5.a 2.B.5.b 2.B.5.c 2.B.5.d");
    }

    #[test]
    fn test_result_cap_is_configurable() {
        let mapper = ready_mapper(MatcherConfig {
            max_results: 3,
            ..MatcherConfig::default()
        });
        assert_eq!(map_one(&mapper, "good with people").onet_skills.len(), 3);
    }

    #[test]
    fn test_min_score_is_not_padded() {
        let mapper = ready_mapper(MatcherConfig {
            min_score: 0.42,
            ..MatcherConfig::default()
        });
        let mapping = map_one(&mapper, "good with people");
        assert_eq!(
            names(&mapping),
            vec!["Social Perceptiveness", "Management of Personnel Resources"]
        );
    }

    #[test]
    fn test_builtin_synonyms_can_be_disabled() {
        let mapper = ready_mapper(MatcherConfig {
            builtin_synonyms: false,
            ..MatcherConfig::default()
        });
        let mapping = map_one(&mapper, "coding");
        assert_eq!(names(&mapping), vec!["Programming"]);
        assert!((mapping.onet_skills[0].score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_caller_supplied_synonyms() {
        let curated = CuratedSynonyms::from_json(CURATED.as_bytes()).unwrap();
        let mut mapper = SkillMapper::new(MatcherConfig::default());
        let source = ONET_SKILLS.as_bytes();
        mapper.initialize(source, Some(&curated)).unwrap();

        let mapping = map_one(&mapper, "People Person");
        assert_eq!(mapping.onet_skills[0].name, "Social Perceptiveness");
        assert_eq!(mapping.onet_skills[0].match_type, MatchType::Exact);
        assert!((mapping.onet_skills[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_json_phrases() {
        let mapper = mapper();
        let mappings = mapper
            .map_json_phrases(&json!(["writing", "sales"]))
            .unwrap();
        assert_eq!(mappings.len(), 2);

        assert!(matches!(
            mapper.map_json_phrases(&json!("writing")),
            Err(MapperError::InvalidInput(_))
        ));
        let err = mapper.map_json_phrases(&json!(["writing", 42]));
        assert_eq!(
            err.unwrap_err(),
            MapperError::InvalidInput("phrases[1] is not a string".to_string())
        );
        assert!(mapper.map_json_phrases(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_callers_see_same_results() {
        let mapper = mapper();
        let phrases = ["good with people"];
        let expected = mapper.map_user_skills(&phrases).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let mapper = mapper.clone();
                    scope.spawn(move || mapper.map_user_skills(&phrases).unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_get_skill() {
        let mapper = mapper();
        let skill = mapper.get_skill("2.B.3.e").unwrap().unwrap();
        assert_eq!(skill.name, "Programming");
        assert!(mapper.get_skill("0.0.0").unwrap().is_none());
    }

    #[test]
    fn test_search_skills_exact_name_first() {
        let result = mapper().search_skills("Writing", 10).unwrap();
        assert_eq!(result.total, 2);
        let found: Vec<_> = result.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(found, vec!["Writing", "Programming"]);
    }

    #[test]
    fn test_search_skills_limit_and_total() {
        let result = mapper().search_skills("management", 2).unwrap();
        assert_eq!(result.total, 4);
        let found: Vec<_> = result.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            found,
            vec![
                "Management of Financial Resources",
                "Management of Material Resources"
            ]
        );
    }

    #[test]
    fn test_blank_search_lists_taxonomy() {
        let result = mapper().search_skills("  ", 50).unwrap();
        assert_eq!(result.total, 35);
        assert_eq!(result.skills[0].id, "2.A.1.a");
    }

    #[test]
    fn test_very_long_phrase_returns_quickly() {
        let mapper = mapper();
        let phrase = "lorem ipsum ".repeat(20_000);

        let started = std::time::Instant::now();
        let mapping = map_one(&mapper, &phrase);
        assert!(mapping.onet_skills.is_empty());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_load_report_and_config() {
        let config = MatcherConfig {
            max_results: 5,
            ..MatcherConfig::default()
        };
        let mut mapper = SkillMapper::new(config);
        assert_eq!(mapper.load_report().unwrap_err(), MapperError::NotReady);

        let csv = format!("{ONET_SKILLS}2.A.1.a,Duplicate,Basic Skills,Repeated id,\n");
        let returned = mapper.initialize(csv.as_bytes(), None).unwrap();

        let report = mapper.load_report().unwrap();
        assert_eq!(report, &returned);
        assert_eq!(report.loaded, 35);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id.as_deref(), Some("2.A.1.a"));
        assert_eq!(mapper.config().max_results, 5);
    }

    #[test]
    fn test_stats() {
        let stats = mapper().stats().unwrap();
        assert_eq!(stats.skills_count, 35);
        assert_eq!(stats.skipped_rows, 0);
        assert!(stats.index_keys > stats.skills_count);
        assert!(stats.index_entries >= stats.index_keys);
    }
}
