//! Turning text into vectors, and choosing a backend for it.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{OllamaProvider, OpenAiProvider, TrigramProvider};
use meridian_core::{AppError, AppResult};
use std::sync::Arc;

/// An embedding backend.
///
/// Ingest and query must go through providers with the same name, model and
/// dimensions; [`EmbeddingConfig::validate_consistency`] enforces that.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// One vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let texts = [text.to_string()];
        match self.embed_batch(&texts).await?.into_iter().next() {
            Some(vector) => Ok(vector),
            None => Err(AppError::Knowledge(format!(
                "{} returned no vector for the query",
                self.provider_name()
            ))),
        }
    }
}

/// Provider named by `config.provider`.
///
/// `trigram` (alias `mock`) runs offline. `openai` needs a non-blank key.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Knowledge(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    let provider: Arc<dyn EmbeddingProvider> = match config.provider.as_str() {
        "trigram" | "mock" => Arc::new(TrigramProvider::new(config.dimensions)),
        "ollama" => Arc::new(OllamaProvider::new(config)),
        "openai" => match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Arc::new(OpenAiProvider::new(config, key)),
            None => {
                return Err(AppError::Knowledge(
                    "OpenAI embedding provider requires an API key".to_string(),
                ))
            }
        },
        other => {
            return Err(AppError::Knowledge(format!(
                "Unknown embedding provider: '{}'. Supported providers: trigram, openai, ollama",
                other
            )))
        }
    };

    tracing::debug!(embedding = %config.describe(), "Embedding provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider(&EmbeddingConfig::default(), None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_mock_alias() {
        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config, None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
    }

    #[test]
    fn test_openai_requires_key() {
        let config = EmbeddingConfig {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            ..Default::default()
        };

        assert!(create_provider(&config, None).is_err());
        let provider = create_provider(&config, Some("sk-test")).unwrap();
        assert_eq!(provider.model_name(), "text-embedding-3-small");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "unknown".to_string(),
            ..Default::default()
        };

        let err = create_provider(&config, None).unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&EmbeddingConfig::default(), None).unwrap();
        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
