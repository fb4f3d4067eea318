//! LLM-backed question classification.

use crate::category::Category;
use meridian_core::{AppConfig, AppError, AppResult};
use meridian_llm::{create_client, LlmClient, LlmRequest};
use meridian_prompt::{ids, PromptLibrary};
use std::sync::Arc;

/// Asks a backend which category a question belongs to.
pub struct Classifier {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompts: Arc<PromptLibrary>,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            prompts: Arc::new(PromptLibrary::builtin()),
        }
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptLibrary>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Classifier on the configured provider, without opening any knowledge base.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let prompts = Arc::new(PromptLibrary::load(&config.workspace)?);
        let llm = client_from_config(config)?;
        Ok(Self::new(llm, config.classifier_model()).with_prompts(prompts))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify a question. Never fails; backend errors give [`Category::Web`].
    pub async fn classify(&self, question: &str) -> Category {
        match self.ask(question).await {
            Ok(raw) => {
                let category = Category::from_classifier_output(&raw);
                tracing::debug!(raw = %raw.trim(), %category, "Classified question");
                category
            }
            Err(e) => {
                tracing::warn!(error = %e, "Classification failed, routing to web");
                Category::Web
            }
        }
    }

    async fn ask(&self, question: &str) -> AppResult<String> {
        let built = self.prompts.render(ids::CLASSIFY, &[("question", question)])?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        Ok(self.llm.complete(&request).await?.content)
    }
}

/// Generation client for the configured provider.
pub(crate) fn client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let api_key = config.resolve_api_key(&config.provider);
    let endpoint = config.endpoint(&config.provider);
    create_client(
        &config.provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        config.request_timeout(&config.provider),
    )
    .map_err(AppError::Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_llm::mock::{FailingClient, ScriptedClient};

    #[tokio::test]
    async fn test_classify_sends_fixed_prompt() {
        let llm = Arc::new(ScriptedClient::always("clinical"));
        let classifier = Classifier::new(llm.clone(), "classifier-model");

        assert_eq!(
            classifier.classify("Phase 3 aspirin trials?").await,
            Category::Clinical
        );

        let request = &llm.requests()[0];
        assert_eq!(request.model, "classifier-model");
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.prompt.contains("Phase 3 aspirin trials?"));
        assert!(request.prompt.contains("exactly one word"));
    }

    #[tokio::test]
    async fn test_sentence_output_is_web() {
        let classifier = Classifier::new(
            Arc::new(ScriptedClient::always("I think this is about clinical trials")),
            "m",
        );
        assert_eq!(classifier.classify("Tell me about trials").await, Category::Web);
    }

    #[tokio::test]
    async fn test_backend_failure_is_web() {
        let classifier = Classifier::new(Arc::new(FailingClient::new("down")), "m");
        assert_eq!(classifier.classify("anything").await, Category::Web);
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let workspace = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            workspace: workspace.path().to_path_buf(),
            provider: "anthropic".to_string(),
            ..Default::default()
        };

        let err = Classifier::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn test_from_config_uses_classifier_model() {
        let workspace = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig {
            workspace: workspace.path().to_path_buf(),
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            ..Default::default()
        };
        config.routing.classifier_model = Some("qwen2.5:0.5b".to_string());

        let classifier = Classifier::from_config(&config).unwrap();
        assert_eq!(classifier.model(), "qwen2.5:0.5b");
    }
}
