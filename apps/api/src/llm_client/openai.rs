use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, CompletionBackend, Prompt};

const DEFAULT_API_BASE: &str = "https://api.cerebras.ai/v1";
const DEFAULT_MODEL: &str = "gpt-oss-120b";
const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Any endpoint speaking the OpenAI chat completions dialect.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(client: Client, api_key: String, api_base: Option<String>, model: Option<String>) -> Self {
        let base = api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            client,
            api_key,
            endpoint: chat_endpoint(&base),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

fn chat_endpoint(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &Prompt, max_output_tokens: u32) -> Result<String, BackendError> {
        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: max_output_tokens,
            temperature: 0.2,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(BackendError::from_status(PROVIDER, status, &message));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::fatal(PROVIDER, format!("undecodable response: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "openai call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(BackendError::transient(PROVIDER, "response carried no choices"));
        };
        debug!("openai finish_reason={:?}", choice.finish_reason);

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(BackendError::transient(PROVIDER, "empty completion")),
        }
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}
