use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the generation client, its concurrency limit and the containment policy.
    pub orchestrator: Arc<Orchestrator>,
}
