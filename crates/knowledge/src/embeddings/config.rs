//! Embedding settings stored with each knowledge base.

use meridian_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Which embedding model a base was built with.
///
/// Persisted in the base's `config.yaml`; a query must be embedded with the
/// same settings as the stored chunks for scores to mean anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// `trigram` (offline), `openai` or `ollama`
    pub provider: String,

    pub model: String,

    /// Vector length produced by the model
    pub dimensions: usize,

    /// Base URL override for remote providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            batch_size: default_batch_size(),
        }
    }
}

impl EmbeddingConfig {
    /// `provider/model (N dims)`, used in logs and errors.
    pub fn describe(&self) -> String {
        format!("{}/{} ({} dims)", self.provider, self.model, self.dimensions)
    }

    /// Fail unless `requested` produces vectors comparable with this config.
    ///
    /// Endpoint and batch size do not affect the vectors and may differ.
    pub fn validate_consistency(&self, requested: &Self) -> AppResult<()> {
        let same_space = self.provider == requested.provider
            && self.model == requested.model
            && self.dimensions == requested.dimensions;

        if same_space {
            return Ok(());
        }

        Err(AppError::Knowledge(format!(
            "Base was embedded with {} but {} was requested. Re-ingest with --reset to switch models.",
            self.describe(),
            requested.describe()
        )))
    }
}
