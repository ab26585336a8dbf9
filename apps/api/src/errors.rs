use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::{PipelineError, PipelineFailure};
use crate::render::TemplateRenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineFailure> for AppError {
    fn from(failure: PipelineFailure) -> Self {
        match failure.error {
            PipelineError::InvalidInput(msg) => AppError::Validation(msg),
            PipelineError::Generation(e) => AppError::Llm(format!("{} ({})", e, failure.stage)),
            e @ PipelineError::Timeout { .. } => AppError::Timeout(e.to_string()),
            PipelineError::Cancelled => AppError::Cancelled,
        }
    }
}

impl From<TemplateRenderError> for AppError {
    fn from(e: TemplateRenderError) -> Self {
        match e {
            TemplateRenderError::UnknownTemplate(_) => AppError::Validation(e.to_string()),
            TemplateRenderError::MissingField(_) | TemplateRenderError::ValidationFailed { .. } => {
                AppError::UnprocessableEntity(e.to_string())
            }
            TemplateRenderError::Malformed { .. } => AppError::Internal(anyhow::anyhow!(e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The generation backend did not produce a usable result".to_string(),
                )
            }
            AppError::Timeout(msg) => {
                tracing::warn!("Timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg.clone())
            }
            AppError::Cancelled => (
                StatusCode::REQUEST_TIMEOUT,
                "CANCELLED",
                "The request was cancelled".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::generation::client::GenerationError;
    use crate::llm_client::BackendError;
    use crate::pipeline::Stage;

    fn status_of(failure: PipelineFailure) -> StatusCode {
        AppError::from(failure).into_response().status()
    }

    #[test]
    fn test_pipeline_failures_map_to_statuses() {
        let generation = PipelineFailure::new(
            Stage::Generating,
            GenerationError::Backend(BackendError::fatal("test", "status 401")),
        );
        assert_eq!(status_of(generation), StatusCode::BAD_GATEWAY);

        let timeout = PipelineFailure::new(
            Stage::Generating,
            PipelineError::Timeout {
                budget: Duration::from_secs(180),
            },
        );
        assert_eq!(status_of(timeout), StatusCode::GATEWAY_TIMEOUT);

        let invalid = PipelineFailure::new(Stage::Received, PipelineError::InvalidInput("empty".into()));
        assert_eq!(status_of(invalid), StatusCode::BAD_REQUEST);

        let cancelled = PipelineFailure::new(Stage::Generating, PipelineError::Cancelled);
        assert_eq!(status_of(cancelled), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_render_errors_map_to_statuses() {
        let unknown = AppError::from(TemplateRenderError::UnknownTemplate("fancy".into()));
        assert_eq!(unknown.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(TemplateRenderError::MissingField("contact.name".into()));
        assert_eq!(missing.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
