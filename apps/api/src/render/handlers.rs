//! Axum route handlers for the Render API.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::profile::{GeneratedProfile, JobContext, SourceProfile};
use crate::render::{render, TemplateId, ValidatedProfile};
use crate::state::AppState;
use crate::validation::validate;

const WARNINGS_HEADER: HeaderName = HeaderName::from_static("x-render-warnings");

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub source: SourceProfile,
    /// Only its contact override matters here.
    #[serde(default)]
    pub job: JobContext,
    pub profile: GeneratedProfile,
    pub template: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub description: &'static str,
    pub markup: &'static str,
    pub content_type: &'static str,
    pub aliases: &'static [&'static str],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/render
///
/// Re-validates the profile against its source, then renders it. A profile
/// that fails validation is rejected unless `force` is set.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let template: TemplateId = request.template.parse()?;

    let report = validate(
        &request.source,
        &request.profile,
        &request.job,
        state.orchestrator.policy(),
    );
    let validated = if request.force {
        if !report.passed {
            warn!(
                "force-rendering '{template}' with {} validation errors",
                report.error_count()
            );
        }
        ValidatedProfile::force(&request.profile, &report)
    } else {
        ValidatedProfile::accept(&request.profile, &report)?
    };

    let artifact = render(&validated, template)?;
    info!(
        "rendered '{}' ({} bytes, {} warnings)",
        artifact.template_id(),
        artifact.content().len(),
        artifact.warnings().len()
    );

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(artifact.content_type())),
        (WARNINGS_HEADER, HeaderValue::from(artifact.warnings().len())),
    ];
    Ok((headers, artifact.into_content()).into_response())
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        TemplateId::ALL
            .into_iter()
            .map(|id| TemplateInfo {
                id,
                description: id.description(),
                markup: id.markup().as_str(),
                content_type: id.content_type(),
                aliases: id.aliases(),
            })
            .collect(),
    )
}
