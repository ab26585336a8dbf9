mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod pipeline;
mod render;
mod repair;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::client::GenerationClient;
use crate::llm_client::build_backend;
use crate::pipeline::Orchestrator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::validation::ContainmentPolicy;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));
    info!("{config:?}");

    // Initialize the generation backend
    let backend = build_backend(&config.llm)?;
    info!(
        "LLM backend initialized (provider: {}, model: {})",
        backend.name(),
        backend.model()
    );

    let client = GenerationClient::new(backend, &config.generation, config.llm.call_timeout);
    info!(
        "Generation client: {} attempts, {} concurrent calls, {}s budget",
        config.generation.max_attempts,
        config.generation.max_concurrent,
        config.generation.total_budget.as_secs()
    );

    // Containment is strict unless SKILL_ALIASES lists explicit allowances
    let policy = ContainmentPolicy::with_aliases(&config.skill_aliases);
    if !config.skill_aliases.is_empty() {
        info!("Skill aliases enabled for {} items", config.skill_aliases.len());
    }

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(client), &config.generation, policy));

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
