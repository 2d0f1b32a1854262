use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillmap_api::config::Config;
use skillmap_api::matching::SkillMapper;
use skillmap_api::routes::build_router;
use skillmap_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("skillmap_api={0},tower_http={0}", config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skillmap API v{}", env!("CARGO_PKG_VERSION"));

    // Load the taxonomy and build the synonym index
    let mut mapper = SkillMapper::new(config.matcher);
    let report = mapper
        .initialize_from_paths(&config.taxonomy_path, config.synonyms_path.as_deref())
        .with_context(|| {
            format!(
                "failed to load taxonomy from {}",
                config.taxonomy_path.display()
            )
        })?;
    if !report.errors.is_empty() {
        warn!(
            "Taxonomy loaded with {} skipped rows (see warnings above)",
            report.errors.len()
        );
    }
    info!(
        "Taxonomy loaded: {} skills from {}",
        report.loaded,
        config.taxonomy_path.display()
    );

    let state = AppState {
        mapper,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
