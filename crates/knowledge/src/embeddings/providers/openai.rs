//! OpenAI embeddings provider (`/v1/embeddings`).

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use meridian_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAiProvider {
    pub fn new(config: &EmbeddingConfig, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_OPENAI_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Only the text-embedding-3 family accepts a `dimensions` parameter.
    fn requested_dimensions(&self) -> Option<usize> {
        self.model
            .starts_with("text-embedding-3")
            .then_some(self.dimensions)
    }

    async fn embed_chunk(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.requested_dimensions(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("OpenAI embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Knowledge(format!(
                "OpenAI embedding API error ({}): {}",
                status, body
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to parse OpenAI embedding response: {}", e))
        })?;

        collect_ordered(body.data, texts.len(), self.dimensions)
    }
}

/// Put embeddings back in input order and check their shape.
fn collect_ordered(
    mut data: Vec<EmbeddingData>,
    expected: usize,
    dimensions: usize,
) -> AppResult<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(AppError::Knowledge(format!(
            "OpenAI returned {} embeddings for {} inputs",
            data.len(),
            expected
        )));
    }

    data.sort_by_key(|d| d.index);
    data.into_iter()
        .map(|d| {
            if d.embedding.len() == dimensions {
                Ok(d.embedding)
            } else {
                Err(AppError::Knowledge(format!(
                    "Unexpected embedding dimensions: got {}, expected {}",
                    d.embedding.len(),
                    dimensions
                )))
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!("Embedding {} texts with OpenAI", batch.len());
            embeddings.extend(self.embed_chunk(batch).await?);
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(model: &str) -> OpenAiProvider {
        let config = EmbeddingConfig {
            provider: "openai".to_string(),
            model: model.to_string(),
            dimensions: 3,
            ..Default::default()
        };
        OpenAiProvider::new(&config, "sk-test")
    }

    #[test]
    fn test_requested_dimensions() {
        assert_eq!(
            provider("text-embedding-3-small").requested_dimensions(),
            Some(3)
        );
        assert_eq!(provider("text-embedding-ada-002").requested_dimensions(), None);
    }

    #[test]
    fn test_collect_ordered_restores_input_order() {
        let data = vec![
            EmbeddingData {
                index: 1,
                embedding: vec![0.0, 1.0, 0.0],
            },
            EmbeddingData {
                index: 0,
                embedding: vec![1.0, 0.0, 0.0],
            },
        ];

        let ordered = collect_ordered(data, 2, 3).unwrap();
        assert_eq!(ordered[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(ordered[1], vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_collect_ordered_rejects_bad_shapes() {
        let data = vec![EmbeddingData {
            index: 0,
            embedding: vec![1.0],
        }];
        assert!(collect_ordered(data, 1, 3).is_err());
        assert!(collect_ordered(Vec::new(), 1, 3).is_err());
    }

    #[test]
    fn test_request_shape() {
        let texts = vec!["a".to_string()];
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &texts,
            dimensions: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][0], "a");
        assert!(json.get("dimensions").is_none());
    }
}
