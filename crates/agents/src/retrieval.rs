//! Retrieval-augmented agents over a single knowledge base.
//!
//! The food-security and clinical agents share one implementation and
//! differ only in their [`Domain`]: prompt, chunking defaults and the
//! sentence returned when the context holds nothing relevant.

use crate::agent::Agent;
use crate::category::Category;
use meridian_core::AppResult;
use meridian_knowledge::{RetrievedChunk, Retriever};
use meridian_llm::{LlmClient, LlmRequest};
use meridian_prompt::{ids, PromptLibrary};
use std::sync::Arc;

/// Default number of chunks placed in the prompt.
pub const DEFAULT_TOP_K: usize = 3;

/// Knowledge domain of a retrieval agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Food,
    Clinical,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Clinical => "clinical",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Food => Category::Food,
            Self::Clinical => Category::Clinical,
        }
    }

    /// Id of the prompt template used to answer.
    pub fn prompt_id(&self) -> &'static str {
        match self {
            Self::Food => ids::FOOD,
            Self::Clinical => ids::CLINICAL,
        }
    }

    /// The sentence the agent gives when its documents do not cover a question.
    pub fn dont_know(&self) -> &'static str {
        match self {
            Self::Food => "I'm not sure based on the information I have.",
            Self::Clinical => "I do not have that information.",
        }
    }

    /// `(chunk_size, chunk_overlap)` used when ingesting this domain's sources.
    ///
    /// Report pages are long prose; registry rows are short and self-contained.
    pub fn default_chunking(&self) -> (u32, u32) {
        match self {
            Self::Food => (1000, 200),
            Self::Clinical => (1000, 100),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers questions from the top-K chunks of one knowledge base.
pub struct RetrievalAgent {
    domain: Domain,
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmClient>,
    model: String,
    top_k: usize,
    prompts: Arc<PromptLibrary>,
}

impl RetrievalAgent {
    pub fn new(
        domain: Domain,
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            retriever,
            llm,
            model: model.into(),
            top_k: DEFAULT_TOP_K,
            prompts: Arc::new(PromptLibrary::builtin()),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptLibrary>) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    async fn generate(&self, question: &str) -> AppResult<String> {
        let hits = self.retriever.retrieve(question, self.top_k).await?;

        if hits.is_empty() {
            tracing::info!(
                agent = self.domain.as_str(),
                base = self.retriever.name(),
                "No relevant chunks, answering without the model"
            );
            return Ok(self.domain.dont_know().to_string());
        }

        tracing::debug!(
            agent = self.domain.as_str(),
            chunks = hits.len(),
            top_score = hits[0].score,
            "Retrieved context"
        );

        let context = build_context(&hits);
        let built = self.prompts.render(
            self.domain.prompt_id(),
            &[("context", context.as_str()), ("question", question)],
        )?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.llm.complete(&request).await?;
        Ok(response.content.trim().to_string())
    }
}

/// Join retrieved chunk texts, best first, separated by blank lines.
fn build_context(hits: &[RetrievedChunk]) -> String {
    hits.iter()
        .map(|hit| hit.chunk.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait::async_trait]
impl Agent for RetrievalAgent {
    fn name(&self) -> &str {
        self.domain.as_str()
    }

    /// Retrieval and generation failures become an apologetic answer
    /// rather than an error.
    async fn answer(&self, question: &str) -> AppResult<String> {
        match self.generate(question).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                tracing::warn!(agent = self.domain.as_str(), error = %e, "Agent failed to answer");
                Ok(format!(
                    "The {} agent encountered an error while answering: {}",
                    self.domain, e
                ))
            }
        }
    }
}
