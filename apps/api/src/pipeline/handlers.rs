//! Axum route handlers for the optimization pipeline.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::profile::{JobContext, SourceProfile};
use crate::pipeline::OptimizationOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub source: SourceProfile,
    pub job: JobContext,
}

/// POST /api/v1/optimize
///
/// Returns the generated profile with its validation report, including when
/// validation did not pass. A client disconnect drops the handler future,
/// which cancels the outstanding generation call.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizationOutcome>, AppError> {
    let outcome = state
        .orchestrator
        .optimize(request.source, request.job)
        .await?;
    Ok(Json(outcome))
}
