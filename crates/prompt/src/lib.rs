//! Prompt system for Meridian.
//!
//! This crate provides the prompts every agent sends to its backend:
//! - Built-in definitions for the classifier and the three agents
//! - YAML overrides from `<workspace>/.meridian/prompts/<id>.yml`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod library;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use library::PromptLibrary;
pub use loader::{list_prompts, load_prompt};
pub use types::{ids, BuiltPrompt, PromptDefinition};
