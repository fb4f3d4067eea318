//! Ollama backend over the non-streaming `/api/generate` endpoint.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use meridian_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Used when the provider config sets no `timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct GenerateBody {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize, Default)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Client for a local or remote Ollama server. No credential needed.
pub struct OllamaClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl From<&LlmRequest> for GenerateBody {
    fn from(request: &LlmRequest) -> Self {
        Self {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
                stop: request.stop.clone(),
            },
        }
    }
}

impl From<GenerateReply> for LlmResponse {
    fn from(reply: GenerateReply) -> Self {
        Self {
            content: reply.response,
            model: reply.model,
            usage: LlmUsage::new(
                reply.prompt_eval_count.unwrap_or(0),
                reply.eval_count.unwrap_or(0),
            ),
        }
    }
}

impl OllamaClient {
    /// Client for `http://localhost:11434`.
    pub fn new() -> Self {
        Self::with_base_url(crate::types::ProviderType::Ollama.default_endpoint())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Local models can take minutes on a cold load; raise `timeout` for those.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(model = %request.model, %url, "Ollama generate");

        let response = self
            .http
            .post(&url)
            .json(&GenerateBody::from(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Ollama unreachable at {}: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!("Ollama returned {}: {}", status, body.trim())));
        }

        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Unexpected Ollama reply: {}", e)))?;

        tracing::debug!(eval_count = ?reply.eval_count, "Ollama reply received");
        Ok(reply.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::with_base_url("http://gpu-box:11434/");
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://gpu-box:11434");
        assert_eq!(OllamaClient::new().base_url, "http://localhost:11434");
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_custom_timeout() {
        let client = OllamaClient::with_timeout("http://gpu-box:11434", Duration::from_secs(600));
        assert_eq!(client.timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_generate_body() {
        let request = LlmRequest::new("Hello", "llama3.2")
            .with_temperature(0.0)
            .with_max_tokens(100)
            .with_stop("\nObservation:");

        let json = serde_json::to_value(GenerateBody::from(&request)).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["prompt"], "Hello");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.0);
        assert_eq!(json["options"]["num_predict"], 100);
        assert_eq!(json["options"]["stop"][0], "\nObservation:");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_reply_conversion() {
        let raw: GenerateReply = serde_json::from_str(
            r#"{"model":"llama3.2","response":"food","done":true,"prompt_eval_count":12,"eval_count":1}"#,
        )
        .unwrap();

        let response = LlmResponse::from(raw);
        assert_eq!(response.content, "food");
        assert_eq!(response.usage.total_tokens, 13);
    }
}
