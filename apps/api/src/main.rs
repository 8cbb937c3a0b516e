mod analysis;
mod config;
mod document;
mod errors;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::vocabulary::SkillVocabulary;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting résumé optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Build the skill vocabulary (built-in list, optionally extended from a JSON file)
    let vocabulary = build_vocabulary(&config)?;
    info!("Skill vocabulary loaded: {} canonical skills", vocabulary.len());
    info!("Fuzzy match threshold: {}", config.fuzzy_threshold);

    let state = AppState::new(config.clone(), vocabulary);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_vocabulary(config: &Config) -> Result<SkillVocabulary> {
    let builtin = SkillVocabulary::builtin();
    let Some(path) = &config.vocabulary_path else {
        return Ok(builtin);
    };

    let extra = SkillVocabulary::load_entries(path)
        .with_context(|| format!("SKILL_VOCABULARY_PATH={}", path.display()))?;
    info!(
        "Extending vocabulary with {} entries from {}",
        extra.len(),
        path.display()
    );
    Ok(builtin.extended(extra))
}
