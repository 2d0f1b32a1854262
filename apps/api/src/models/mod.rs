pub mod mapping;
pub mod skill;

pub use mapping::{MappedSkill, MatchCandidate, MatchType, SkillMapping};
pub use skill::{SkillRecord, TaxonomyStats};
