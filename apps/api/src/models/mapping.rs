use serde::{Deserialize, Serialize};

/// How a candidate was matched. Variants are declared in priority order:
/// `Exact` outranks `Synonym`, which outranks `Fuzzy`, when scores tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Synonym,
    Fuzzy,
}

impl MatchType {
    /// Lower is stronger.
    pub fn priority(self) -> u8 {
        match self {
            MatchType::Exact => 0,
            MatchType::Synonym => 1,
            MatchType::Fuzzy => 2,
        }
    }
}

/// Transient result of scoring one phrase against one index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub skill_id: String,
    pub score: f64, // 0.0 – 1.0
    pub match_type: MatchType,
}

impl MatchCandidate {
    /// True when `self` should replace `other` as the best hit for a skill.
    pub fn beats(&self, other: &MatchCandidate) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        self.match_type.priority() < other.match_type.priority()
    }
}

/// A taxonomy skill as returned to callers for one input phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedSkill {
    pub id: String,
    pub name: String,
    pub category: String,
    pub score: f64,
    pub match_type: MatchType,
}

/// Ranked taxonomy skills for a single input phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMapping {
    pub input_phrase: String,
    pub onet_skills: Vec<MappedSkill>,
}
