//! Prompt types for Meridian.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifiers of the prompts the router and agents render.
pub mod ids {
    /// Question classification (food / clinical / web)
    pub const CLASSIFY: &str = "router.classify";
    /// Food-security retrieval answer
    pub const FOOD: &str = "agent.food";
    /// Clinical-study retrieval answer
    pub const CLINICAL: &str = "agent.clinical";
    /// Web agent reasoning step
    pub const WEB: &str = "agent.web";

    /// All built-in prompt ids.
    pub const ALL: [&str; 4] = [CLASSIFY, FOOD, CLINICAL, WEB];
}

/// A prompt definition, built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Optional system message template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Template string with Handlebars syntax
    pub template: String,
}

/// A fully rendered prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}
