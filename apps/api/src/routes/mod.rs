pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::pipeline::handlers as pipeline;
use crate::render::handlers as render;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Optimization pipeline
        .route("/api/v1/optimize", post(pipeline::handle_optimize))
        // Rendering
        .route("/api/v1/render", post(render::handle_render))
        .route("/api/v1/templates", get(render::handle_list_templates))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, GenerationSettings, LlmSettings};
    use crate::generation::client::GenerationClient;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::llm_client::ProviderKind;
    use crate::pipeline::Orchestrator;
    use crate::validation::ContainmentPolicy;

    fn app(backend: ScriptedBackend) -> Router {
        let config = Config {
            port: 0,
            rust_log: "debug".to_string(),
            llm: LlmSettings {
                provider: ProviderKind::Ollama,
                api_key: None,
                api_base: None,
                model: None,
                call_timeout: Duration::from_secs(5),
            },
            generation: GenerationSettings::default(),
            skill_aliases: BTreeMap::new(),
        };
        let client = GenerationClient::new(Arc::new(backend), &config.generation, config.llm.call_timeout);
        let orchestrator = Orchestrator::new(Arc::new(client), &config.generation, ContainmentPolicy::strict());
        build_router(AppState {
            config,
            orchestrator: Arc::new(orchestrator),
        })
    }

    fn source() -> Value {
        json!({
            "contact": {"name": "Ann Lee", "email": "a@x.com", "phone": "+1 555", "address": "Berlin"},
            "skills": {"hard": ["Python", "Docker"], "soft": []},
            "experience": [{"title": "Engineer", "organization": "Acme", "start_date": "2020", "end_date": "Present"}]
        })
    }

    async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(ScriptedBackend::replying("{}"))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "ollama");
    }

    #[tokio::test]
    async fn test_optimize_returns_report_even_when_failed() {
        let mut generated = source();
        generated["skills"]["hard"] = json!(["Python", "Docker", "Kubernetes"]);
        let app = app(ScriptedBackend::replying(&generated.to_string()));

        let (status, _, body) = post(
            app,
            "/api/v1/optimize",
            json!({"source": source(), "job": {"description": "Python backend role"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["report"]["passed"], false);
        assert_eq!(body["report"]["errors"][0]["code"], "hallucinated_skill");
        assert_eq!(body["stages"][4], "done");
    }

    #[tokio::test]
    async fn test_optimize_unparseable_output_is_bad_gateway() {
        let app = app(ScriptedBackend::replying("no json here"));
        let (status, _, body) = post(
            app,
            "/api/v1/optimize",
            json!({"source": source(), "job": {"description": "Python backend role"}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_render_returns_document_with_headers() {
        let (status, headers, body) = post(
            app(ScriptedBackend::replying("{}")),
            "/api/v1/render",
            json!({"source": source(), "profile": source(), "template": "md"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/markdown; charset=utf-8");
        assert_eq!(headers["x-render-warnings"], "0");
        assert!(String::from_utf8(body).unwrap().starts_with("# Ann Lee"));
    }

    #[tokio::test]
    async fn test_render_rejects_failed_validation_unless_forced() {
        let mut generated = source();
        generated["skills"]["hard"] = json!(["Python", "Kubernetes"]);

        let (status, _, _) = post(
            app(ScriptedBackend::replying("{}")),
            "/api/v1/render",
            json!({"source": source(), "profile": generated.clone(), "template": "html"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, headers, _) = post(
            app(ScriptedBackend::replying("{}")),
            "/api/v1/render",
            json!({"source": source(), "profile": generated, "template": "html", "force": true}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // one hallucination, one omission
        assert_eq!(headers["x-render-warnings"], "2");
    }

    #[tokio::test]
    async fn test_render_unknown_template_is_bad_request() {
        let (status, _, _) = post(
            app(ScriptedBackend::replying("{}")),
            "/api/v1/render",
            json!({"source": source(), "profile": source(), "template": "fancy"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_templates_are_listed() {
        let response = app(ScriptedBackend::replying("{}"))
            .oneshot(Request::builder().uri("/api/v1/templates").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
        let ids: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["classic", "modern", "brilliant", "html", "markdown"]);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = app(ScriptedBackend::replying("{}"))
            .oneshot(Request::builder().uri("/api/v2/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
