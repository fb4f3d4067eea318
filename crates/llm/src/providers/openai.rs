//! OpenAI chat completions provider.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use meridian_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn build_request_body(&self, request: &LlmRequest) -> OpenAiRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }
        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: Some(request.prompt.clone()),
        });

        OpenAiRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stop: request.stop.clone(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending completion request to OpenAI");

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, body_text
            )));
        }

        let oai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let choice = oai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("No choices in OpenAI response".to_string()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: oai_response.model,
            usage: oai_response
                .usage
                .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_openai_format() {
        let client = OpenAiClient::new("https://api.openai.com", "sk-test");
        let request = LlmRequest::new("Hello", "gpt-4o-mini")
            .with_system("Be helpful.")
            .with_temperature(0.0)
            .with_stop("\nObservation:");

        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["stop"][0], "\nObservation:");

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Hello");
    }

    #[test]
    fn request_body_omits_system_when_none() {
        let client = OpenAiClient::new("https://api.openai.com/", "sk-test");
        assert_eq!(client.base_url, "https://api.openai.com");

        let json =
            serde_json::to_value(client.build_request_body(&LlmRequest::new("Hi", "gpt-4o"))).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert!(json.get("stop").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn response_parses_null_content() {
        let raw: OpenAiResponse = serde_json::from_str(
            r#"{"model":"gpt-4o","choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert!(raw.choices[0].message.content.is_none());
        assert!(raw.usage.is_none());
    }
}
