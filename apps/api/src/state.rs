use crate::config::Config;
use crate::matching::SkillMapper;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Ready skill mapper; clones share one immutable taxonomy snapshot.
    pub mapper: SkillMapper,
    pub config: Config,
}
