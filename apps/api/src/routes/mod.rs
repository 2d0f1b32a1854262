pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Skill Mapping API
        .route("/api/v1/skills", get(handlers::handle_search_skills))
        .route("/api/v1/skills/map", post(handlers::handle_map_skills))
        .route("/api/v1/skills/:id", get(handlers::handle_get_skill))
        .route(
            "/api/v1/taxonomy/stats",
            get(handlers::handle_taxonomy_stats),
        )
        .with_state(state)
}
