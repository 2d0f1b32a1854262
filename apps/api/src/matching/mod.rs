// Skill matching: normalization, synonym index, scoring and the public mapper.

pub mod handlers;
pub mod index;
pub mod mapper;
pub mod normalize;
pub mod scorer;

pub use index::SynonymIndex;
pub use mapper::{phrases_from_json, MapperError, SkillMapper, SkillSearch};
pub use scorer::MatcherConfig;
