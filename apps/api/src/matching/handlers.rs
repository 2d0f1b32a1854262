//! Axum route handlers for the Skill Mapping API.

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::matching::mapper::{phrases_from_json, SkillSearch};
use crate::matching::MatcherConfig;
use crate::models::{SkillMapping, SkillRecord, TaxonomyStats};
use crate::state::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// `phrases` is left untyped so a non-string array surfaces as a validation
/// error from the mapper rather than a generic JSON rejection.
#[derive(Debug, Deserialize)]
pub struct MapSkillsRequest {
    #[serde(default)]
    pub phrases: Value,
}

#[derive(Debug, Serialize)]
pub struct MapSkillsResponse {
    pub mappings: Vec<SkillMapping>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub taxonomy: TaxonomyStats,
    pub matcher: MatcherConfig,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/skills/map
///
/// Maps free-text skill phrases to ranked O*NET skills, one mapping per phrase.
pub async fn handle_map_skills(
    State(state): State<AppState>,
    Json(request): Json<MapSkillsRequest>,
) -> Result<Json<MapSkillsResponse>, AppError> {
    let phrases = phrases_from_json(&request.phrases)?;

    // CPU-bound scoring over the whole index; keep it off the async executor.
    let mapper = state.mapper.clone();
    let task = tokio::task::spawn_blocking(move || mapper.map_user_skills(phrases.as_slice()));
    let mappings = task.await.context("skill mapping task failed")??;

    Ok(Json(MapSkillsResponse { mappings }))
}

/// GET /api/v1/skills?search=&limit=
pub async fn handle_search_skills(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SkillSearch>, AppError> {
    let query = params.search.unwrap_or_default();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Ok(Json(state.mapper.search_skills(&query, limit)?))
}

/// GET /api/v1/skills/:id
pub async fn handle_get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SkillRecord>, AppError> {
    let skill = state
        .mapper
        .get_skill(&id)?
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Skill {id} not found")))?;
    Ok(Json(skill))
}

/// GET /api/v1/taxonomy/stats
pub async fn handle_taxonomy_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    Ok(Json(StatsResponse {
        taxonomy: state.mapper.stats()?,
        matcher: *state.mapper.config(),
    }))
}
