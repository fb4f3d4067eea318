//! Open-domain agent driven by a think/act/observe loop.
//!
//! Each step renders the reasoning prompt with the scratchpad so far and asks
//! the backend to continue until it names a tool or gives a final answer.
//! Tool results are appended as observations and the loop repeats, up to
//! `max_iterations` model calls.

mod parser;
mod tools;

pub use parser::{parse_step, Step};
pub use tools::{MockSearch, SearchProvider, Tool, ToolRegistry, WebSearchTool};

use crate::agent::Agent;
use meridian_core::{AppError, AppResult};
use meridian_llm::{LlmClient, LlmRequest};
use meridian_prompt::{ids, PromptLibrary};
use std::sync::Arc;

/// Default limit on model calls per question.
pub const DEFAULT_MAX_ITERATIONS: usize = 6;

/// Where generation must stop so the agent, not the model, supplies observations.
const OBSERVATION_STOP: &str = "\nObservation:";

pub struct WebAgent {
    llm: Arc<dyn LlmClient>,
    model: String,
    tools: ToolRegistry,
    prompts: Arc<PromptLibrary>,
    max_iterations: usize,
}

impl WebAgent {
    /// Web agent with `web_search` backed by [`MockSearch`].
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            tools: ToolRegistry::web_search(Arc::new(MockSearch)),
            prompts: Arc::new(PromptLibrary::builtin()),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Back `web_search` with a different provider.
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.tools = ToolRegistry::web_search(provider);
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptLibrary>) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    async fn think(&self, question: &str, scratchpad: &str) -> AppResult<String> {
        let tool_names = self.tools.names().join(", ");
        let built = self.prompts.render(
            ids::WEB,
            &[
                ("tools", self.tools.describe().as_str()),
                ("tool_names", tool_names.as_str()),
                ("question", question),
                ("scratchpad", scratchpad),
            ],
        )?;

        let mut request = LlmRequest::new(built.user, &self.model)
            .with_temperature(0.0)
            .with_stop(OBSERVATION_STOP);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.llm.complete(&request).await?;

        // Not every backend honours stop sequences
        let text = match response.content.find(OBSERVATION_STOP) {
            Some(idx) => response.content[..idx].to_string(),
            None => response.content,
        };
        Ok(text)
    }
}

#[async_trait::async_trait]
impl Agent for WebAgent {
    fn name(&self) -> &str {
        "web"
    }

    async fn answer(&self, question: &str) -> AppResult<String> {
        let mut scratchpad = String::new();

        for iteration in 0..self.max_iterations {
            let text = self.think(question, &scratchpad).await?;

            match parse_step(&text)? {
                Step::Finish(answer) => {
                    tracing::debug!(iteration, "Web agent finished");
                    return Ok(answer);
                }
                Step::Act { tool, input } => {
                    let handler = self.tools.get(&tool).ok_or_else(|| {
                        AppError::Agent(format!(
                            "unknown tool '{}' requested (available: {})",
                            tool,
                            self.tools.names().join(", ")
                        ))
                    })?;

                    tracing::debug!(iteration, tool = %tool, input = %input, "Calling tool");
                    let observation = handler.call(&input).await?;

                    scratchpad.push_str(text.trim_end());
                    scratchpad.push_str("\nObservation: ");
                    scratchpad.push_str(&observation);
                    scratchpad.push_str("\nThought:");
                }
            }
        }

        Err(AppError::Agent(format!(
            "reasoning loop stopped after {} iterations without a final answer",
            self.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_llm::mock::{FailingClient, ScriptedClient};

    struct FixedSearch;

    #[async_trait::async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, query: &str) -> AppResult<String> {
            Ok(format!("Paris has been the capital since 508 ({})", query))
        }
    }

    #[tokio::test]
    async fn test_direct_final_answer() {
        let llm = Arc::new(ScriptedClient::always(
            " I know this.\nFinal Answer: Paris is the capital of France",
        ));
        let agent = WebAgent::new(llm.clone(), "m");

        let answer = agent.answer("What is the capital of France?").await.unwrap();

        assert_eq!(answer, "Paris is the capital of France");
        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].stop, vec!["\nObservation:".to_string()]);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(requests[0].prompt.contains("web_search: Search the web"));
        assert!(requests[0].system.as_deref().unwrap_or("").contains("web_search"));
    }

    #[tokio::test]
    async fn test_tool_observation_feeds_next_step() {
        let llm = Arc::new(ScriptedClient::new([
            " I should search.\nAction: web_search\nAction Input: capital of France",
            " I now know the final answer\nFinal Answer: Paris",
        ]));
        let agent = WebAgent::new(llm.clone(), "m").with_search(Arc::new(FixedSearch));

        let answer = agent.answer("Capital of France?").await.unwrap();
        assert_eq!(answer, "Paris");

        let second = &llm.requests()[1].prompt;
        assert!(second.contains("Action Input: capital of France"));
        assert!(second.contains(
            "Observation: Paris has been the capital since 508 (capital of France)\nThought:"
        ));
    }

    #[tokio::test]
    async fn test_hallucinated_observation_is_cut() {
        let llm = Arc::new(ScriptedClient::new([
            "Action: web_search\nAction Input: x\nObservation: made up\nFinal Answer: wrong",
            "Final Answer: right",
        ]));
        let agent = WebAgent::new(llm, "m");

        assert_eq!(agent.answer("q").await.unwrap(), "right");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_agent_error() {
        let llm = Arc::new(ScriptedClient::always(
            "Action: calculator\nAction Input: 2+2",
        ));
        let agent = WebAgent::new(llm, "m");

        let err = agent.answer("2+2?").await.unwrap_err();
        assert!(matches!(err, AppError::Agent(_)));
        assert!(err.to_string().contains("calculator"));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let llm = Arc::new(ScriptedClient::always(
            "Action: web_search\nAction Input: again",
        ));
        let agent = WebAgent::new(llm.clone(), "m").with_max_iterations(3);

        let err = agent.answer("loop forever").await.unwrap_err();
        assert!(err.to_string().contains("3 iterations"));
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let agent = WebAgent::new(Arc::new(FailingClient::new("timeout")), "m");
        assert!(matches!(agent.answer("q").await, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_prose_mentioning_action_is_the_answer() {
        let reply = "The 1996 World Food Summit Plan of Action: commitments to halve hunger by 2015.";
        let llm = Arc::new(ScriptedClient::always(reply));
        let agent = WebAgent::new(llm.clone(), "m");

        assert_eq!(agent.answer("What did the 1996 summit commit to?").await.unwrap(), reply);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_action_input_is_parse_error() {
        let agent = WebAgent::new(Arc::new(ScriptedClient::always("Action: web_search")), "m");
        assert!(matches!(agent.answer("q").await, Err(AppError::Parse(_))));
    }
}
