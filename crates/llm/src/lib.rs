//! LLM integration crate for Meridian.
//!
//! Provider-agnostic access to Large Language Models through the
//! [`LlmClient`] trait. The classifier, the retrieval agents and the web
//! agent all talk to a backend through this trait, which keeps them testable
//! with the scripted clients in [`mock`].
//!
//! # Providers
//! - **OpenAI**: chat completions API (API key required)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use meridian_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2").with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod mock;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
