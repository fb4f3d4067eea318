//! Tools available to the web agent.

use meridian_core::AppResult;
use std::sync::Arc;

/// A named capability the model can invoke with a text input.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    async fn call(&self, input: &str) -> AppResult<String>;
}

/// Backend behind the `web_search` tool.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> AppResult<String>;
}

/// Placeholder search backend that echoes the query.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSearch;

#[async_trait::async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> AppResult<String> {
        Ok(format!("Mock search result for '{}'.", query))
    }
}

/// The `web_search` tool.
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub const NAME: &'static str = "web_search";

    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the web for any general question."
    }

    async fn call(&self, input: &str) -> AppResult<String> {
        tracing::debug!(query = input, "web_search");
        self.provider.search(input).await
    }
}

/// Tools by name, in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only `web_search` over `provider`.
    pub fn web_search(provider: Arc<dyn SearchProvider>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WebSearchTool::new(provider)));
        registry
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// `name: description` lines for the prompt.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait::async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "echo"
        }

        async fn call(&self, input: &str) -> AppResult<String> {
            Ok(input.to_string())
        }
    }

    #[tokio::test]
    async fn test_mock_search_result() {
        let result = MockSearch.search("capital of France").await.unwrap();
        assert_eq!(result, "Mock search result for 'capital of France'.");
    }

    #[tokio::test]
    async fn test_web_search_registry() {
        let registry = ToolRegistry::web_search(Arc::new(MockSearch));

        assert_eq!(registry.names(), vec!["web_search"]);
        assert_eq!(
            registry.describe(),
            "web_search: Search the web for any general question."
        );

        let tool = registry.get("web_search").unwrap();
        assert!(tool.call("x").await.unwrap().contains("'x'"));
        assert!(registry.get("calculator").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Echo("a")));
        registry.register(Arc::new(Echo("b")));
        registry.register(Arc::new(Echo("a")));

        assert_eq!(registry.names(), vec!["b", "a"]);
    }
}
