//! The [`LlmClient`] seam and the request/response values passed through it.

use meridian_core::AppResult;
use serde::{Deserialize, Serialize};

/// One single-turn completion. Agents build these with the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Rendered user prompt
    pub prompt: String,

    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Every agent sends 0.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sequences that end generation when produced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system: None,
            temperature: None,
            max_tokens: None,
            stop: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Append a stop sequence; may be called more than once.
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,

    /// Model name as reported by the backend
    pub model: String,

    #[serde(default)]
    pub usage: LlmUsage,
}

impl LlmResponse {
    /// Response without token accounting, as returned by test doubles.
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: LlmUsage::default(),
        }
    }
}

/// Token counts reported by the backend. Zero when it reports none.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LlmUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A text-generation backend.
///
/// Held as `Arc<dyn LlmClient>` and shared by every agent for the life of
/// the process.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Short name used in logs: `openai`, `ollama`, `scripted`.
    fn provider_name(&self) -> &str;

    /// Run one completion. Transport and API failures are [`AppError::Llm`](meridian_core::AppError::Llm).
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
