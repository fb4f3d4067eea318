//! LLM provider factory.
//!
//! Resolves a provider name from configuration into a shared client.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by providers that need one
/// * `timeout` - Request timeout; only Ollama honours it, others keep their default
///
/// # Errors
/// Returns error if the provider is unknown or its API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;
    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    match provider_type {
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_timeout(
            base_url,
            timeout.unwrap_or(crate::providers::ollama::DEFAULT_TIMEOUT),
        ))),
        ProviderType::OpenAI => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            Ok(Arc::new(OpenAiClient::new(base_url, key)))
        }
    }
}
