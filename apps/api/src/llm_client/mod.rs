//! LLM Client: The single point of entry for all text-generation backends.
//!
//! ARCHITECTURAL RULE: No other module may call a provider API directly.
//! Every backend implements `CompletionBackend`; the concrete provider is chosen
//! once at startup by `build_backend` and injected from there.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::LlmSettings;

mod anthropic;
mod ollama;
mod openai;
pub mod prompts;
#[cfg(test)]
pub mod testing;

pub use anthropic::AnthropicBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Backend failure, categorized by whether a retry can help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Timeout, rate limit, 5xx, connection reset, empty completion.
    #[error("transient backend failure ({provider}): {message}")]
    Transient { provider: String, message: String },

    /// Authentication, malformed request, unknown model, undecodable body.
    #[error("fatal backend failure ({provider}): {message}")]
    Fatal { provider: String, message: String },
}

impl BackendError {
    pub fn transient(provider: &str, message: impl Into<String>) -> Self {
        Self::Transient {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn fatal(provider: &str, message: impl Into<String>) -> Self {
        Self::Fatal {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(provider: &str, status: StatusCode, body: &str) -> Self {
        let message = format!("status {}: {}", status.as_u16(), truncate_chars(body, MAX_ERROR_BODY_CHARS));
        if is_transient_status(status) {
            Self::transient(provider, message)
        } else {
            Self::fatal(provider, message)
        }
    }

    /// Classifies a transport-level failure.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::transient(provider, err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(provider, status, &err.to_string())
        } else {
            Self::fatal(provider, err.to_string())
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 409 | 425 | 429) || status.is_server_error()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

/// Instructions sent to a backend: a system preamble and the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Any provider exposing "complete(prompt, max tokens) -> text".
///
/// Implementations hold no per-request state, so one instance is shared by all
/// concurrent pipeline runs.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &Prompt, max_output_tokens: u32) -> Result<String, BackendError>;

    /// Provider name, used in logs and error messages.
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Provider selection
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    /// Any OpenAI-compatible chat completions endpoint (OpenAI, Cerebras, DeepSeek…).
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub fn requires_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "openai-compatible" | "cerebras" => Ok(Self::OpenAi),
            "ollama" | "local" => Ok(Self::Ollama),
            other => anyhow::bail!(
                "LLM_PROVIDER '{other}' is not supported (expected anthropic, openai or ollama)"
            ),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        })
    }
}

/// Constructs the configured backend. Called once at startup.
pub fn build_backend(settings: &LlmSettings) -> anyhow::Result<Arc<dyn CompletionBackend>> {
    let http = Client::builder()
        .timeout(settings.call_timeout)
        .build()
        .expect("Failed to build HTTP client");

    let backend: Arc<dyn CompletionBackend> = match settings.provider {
        ProviderKind::Anthropic => Arc::new(AnthropicBackend::new(
            http,
            require_key(settings)?,
            settings.model.clone(),
        )),
        ProviderKind::OpenAi => Arc::new(OpenAiBackend::new(
            http,
            require_key(settings)?,
            settings.api_base.clone(),
            settings.model.clone(),
        )),
        ProviderKind::Ollama => Arc::new(OllamaBackend::new(
            http,
            settings.api_base.clone(),
            settings.model.clone(),
        )),
    };
    Ok(backend)
}

fn require_key(settings: &LlmSettings) -> anyhow::Result<String> {
    settings
        .api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("provider '{}' requires LLM_API_KEY", settings.provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_and_server_errors_are_transient() {
        for code in [408u16, 429, 500, 502, 503, 529] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(
                BackendError::from_status("test", status, "").is_transient(),
                "{code} should be transient"
            );
        }
    }

    #[test]
    fn test_client_errors_are_fatal() {
        for code in [400u16, 401, 403, 404, 422] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(
                !BackendError::from_status("test", status, "").is_transient(),
                "{code} should be fatal"
            );
        }
    }

    #[test]
    fn test_error_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = BackendError::from_status("test", StatusCode::BAD_GATEWAY, &body);
        assert!(err.to_string().len() < 700);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("cerebras".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("gemini".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_only_ollama_runs_without_key() {
        assert!(ProviderKind::Anthropic.requires_api_key());
        assert!(ProviderKind::OpenAi.requires_api_key());
        assert!(!ProviderKind::Ollama.requires_api_key());
    }
}
