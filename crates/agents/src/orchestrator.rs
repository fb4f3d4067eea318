//! Question routing.
//!
//! [`Orchestrator::run`] classifies a question, dispatches it to the agent for
//! that category and returns the agent's answer. It never fails: a backend
//! failure during classification routes to the web agent, and an agent
//! failure is returned as a sentence naming the category and the error.

use crate::agent::Agent;
use crate::category::Category;
use crate::classifier::{client_from_config, Classifier};
use crate::retrieval::{Domain, RetrievalAgent};
use crate::web::WebAgent;
use meridian_core::{AppConfig, AppError, AppResult};
use meridian_knowledge::KnowledgeBase;
use meridian_llm::LlmClient;
use meridian_prompt::PromptLibrary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An answer together with the category that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedAnswer {
    pub category: Category,
    pub answer: String,
}

pub struct Orchestrator {
    classifier: Classifier,
    food: Arc<dyn Agent>,
    clinical: Arc<dyn Agent>,
    web: Arc<dyn Agent>,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn LlmClient>,
        classifier_model: impl Into<String>,
        food: Arc<dyn Agent>,
        clinical: Arc<dyn Agent>,
        web: Arc<dyn Agent>,
    ) -> Self {
        Self::with_classifier(Classifier::new(classifier, classifier_model), food, clinical, web)
    }

    pub fn with_classifier(
        classifier: Classifier,
        food: Arc<dyn Agent>,
        clinical: Arc<dyn Agent>,
        web: Arc<dyn Agent>,
    ) -> Self {
        Self {
            classifier,
            food,
            clinical,
            web,
        }
    }

    /// Build the classifier and all three agents from configuration.
    ///
    /// # Errors
    /// Fails when the generation backend cannot be created (unknown provider,
    /// missing key), when a prompt override is invalid, or when either
    /// knowledge base is missing or empty.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let prompts = Arc::new(PromptLibrary::load(&config.workspace)?);

        let llm = client_from_config(config)?;

        let embedding_key = config.resolve_api_key("openai");
        let food_base = KnowledgeBase::open(&config.food_index_dir(), embedding_key.as_deref())?;
        let clinical_base =
            KnowledgeBase::open(&config.clinical_index_dir(), embedding_key.as_deref())?;

        let top_k = config.routing.top_k as usize;

        let food = RetrievalAgent::new(Domain::Food, Arc::new(food_base), llm.clone(), &config.model)
            .with_top_k(top_k)
            .with_prompts(prompts.clone());
        let clinical = RetrievalAgent::new(
            Domain::Clinical,
            Arc::new(clinical_base),
            llm.clone(),
            &config.model,
        )
        .with_top_k(top_k)
        .with_prompts(prompts.clone());
        let web = WebAgent::new(llm.clone(), &config.model)
            .with_max_iterations(config.routing.max_iterations as usize)
            .with_prompts(prompts.clone());

        tracing::info!(
            provider = llm.provider_name(),
            model = %config.model,
            classifier_model = config.classifier_model(),
            top_k,
            "Orchestrator ready"
        );

        let classifier = Classifier::new(llm, config.classifier_model()).with_prompts(prompts);

        Ok(Self::with_classifier(
            classifier,
            Arc::new(food),
            Arc::new(clinical),
            Arc::new(web),
        ))
    }

    /// Classify a question. Never fails; backend errors route to [`Category::Web`].
    pub async fn classify(&self, question: &str) -> Category {
        self.classifier.classify(question).await
    }

    /// The agent serving `category`.
    pub fn dispatch(&self, category: Category) -> &Arc<dyn Agent> {
        match category {
            Category::Food => &self.food,
            Category::Clinical => &self.clinical,
            Category::Web => &self.web,
        }
    }

    /// Call an agent, falling back to its legacy entry point when `answer`
    /// is unsupported. Errors become the returned text.
    pub async fn invoke(&self, agent: &dyn Agent, category: Category, question: &str) -> String {
        let result = match agent.answer(question).await {
            Err(AppError::Unsupported(reason)) => {
                tracing::debug!(agent = agent.name(), %reason, "Falling back to run");
                agent.run(question).await
            }
            other => other,
        };

        match result {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(%category, error = %e, "Agent failed");
                format!("The {} agent failed with an error: {}", category, e)
            }
        }
    }

    /// Route a question and report which category answered it.
    pub async fn run_detailed(&self, question: &str) -> RoutedAnswer {
        let category = self.classify(question).await;
        tracing::info!(%category, "Routing question");

        let agent = self.dispatch(category);
        let answer = self.invoke(agent.as_ref(), category, question).await;

        RoutedAnswer { category, answer }
    }

    /// Route a question and return the answer text.
    pub async fn run(&self, question: &str) -> String {
        self.run_detailed(question).await.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_llm::mock::{FailingClient, ScriptedClient};

    struct Named(&'static str);

    #[async_trait::async_trait]
    impl Agent for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn answer(&self, _question: &str) -> AppResult<String> {
            Ok(format!("answered by {}", self.0))
        }
    }

    struct LegacyOnly;

    #[async_trait::async_trait]
    impl Agent for LegacyOnly {
        fn name(&self) -> &str {
            "legacy"
        }

        async fn run(&self, question: &str) -> AppResult<String> {
            Ok(format!("legacy: {}", question))
        }
    }

    struct NoShape;

    #[async_trait::async_trait]
    impl Agent for NoShape {
        fn name(&self) -> &str {
            "none"
        }
    }

    fn orchestrator(classifier: Arc<dyn LlmClient>) -> Orchestrator {
        Orchestrator::new(
            classifier,
            "classifier-model",
            Arc::new(Named("food")),
            Arc::new(Named("clinical")),
            Arc::new(Named("web")),
        )
    }

    #[tokio::test]
    async fn test_classify_delegates_to_classifier() {
        let llm = Arc::new(ScriptedClient::always("clinical"));
        let orch = orchestrator(llm.clone());

        assert_eq!(orch.classify("Phase 3 aspirin trials?").await, Category::Clinical);
        assert_eq!(llm.requests()[0].model, "classifier-model");
    }

    #[tokio::test]
    async fn test_classify_backend_failure_is_web() {
        let orch = orchestrator(Arc::new(FailingClient::new("down")));
        assert_eq!(orch.classify("anything").await, Category::Web);
    }

    #[test]
    fn test_dispatch_is_total_and_stable() {
        let orch = orchestrator(Arc::new(ScriptedClient::always("web")));

        for category in Category::ALL {
            let first = orch.dispatch(category);
            let second = orch.dispatch(category);
            assert!(Arc::ptr_eq(first, second));
            assert_eq!(first.name(), category.as_str());
        }
    }

    #[tokio::test]
    async fn test_invoke_falls_back_to_run() {
        let orch = orchestrator(Arc::new(ScriptedClient::always("web")));
        let answer = orch.invoke(&LegacyOnly, Category::Web, "hello").await;
        assert_eq!(answer, "legacy: hello");
    }

    #[tokio::test]
    async fn test_invoke_reports_unsupported_agent() {
        let orch = orchestrator(Arc::new(ScriptedClient::always("web")));
        let answer = orch.invoke(&NoShape, Category::Clinical, "hello").await;

        assert!(answer.starts_with("The clinical agent failed with an error:"));
        assert!(answer.contains("does not implement run"));
    }

    #[tokio::test]
    async fn test_run_detailed_reports_category() {
        let orch = orchestrator(Arc::new(ScriptedClient::always("  Food \n")));
        let routed = orch.run_detailed("Hunger in 2023?").await;

        assert_eq!(
            routed,
            RoutedAnswer {
                category: Category::Food,
                answer: "answered by food".to_string()
            }
        );
        assert_eq!(
            serde_json::to_value(&routed).unwrap(),
            serde_json::json!({"category": "food", "answer": "answered by food"})
        );
    }
}
