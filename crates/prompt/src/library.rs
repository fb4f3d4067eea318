//! The set of prompts in effect for a workspace.

use crate::builder::build_prompt;
use crate::builtin::builtin_prompts;
use crate::loader::{list_prompts, load_prompt};
use crate::types::{BuiltPrompt, PromptDefinition};
use meridian_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Built-in prompts with workspace overrides applied.
///
/// Built once at start-up and shared read-only by every agent.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    prompts: HashMap<String, PromptDefinition>,
}

impl PromptLibrary {
    /// The built-in prompts only.
    pub fn builtin() -> Self {
        Self {
            prompts: builtin_prompts()
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
        }
    }

    /// Built-in prompts overridden by `<workspace>/.meridian/prompts/*.yml`.
    ///
    /// Any override that fails to load or validate is an error.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        let mut library = Self::builtin();

        for id in list_prompts(workspace_path)? {
            let definition = load_prompt(workspace_path, &id)?;
            if !library.prompts.contains_key(&id) {
                tracing::warn!("Prompt override '{}' does not replace any built-in prompt", id);
            }
            library.prompts.insert(id, definition);
        }

        Ok(library)
    }

    /// Look up a prompt definition.
    pub fn get(&self, id: &str) -> AppResult<&PromptDefinition> {
        self.prompts
            .get(id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", id)))
    }

    /// Render a prompt with `(name, value)` variables.
    pub fn render(&self, id: &str, variables: &[(&str, &str)]) -> AppResult<BuiltPrompt> {
        let vars = variables
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_prompt(self.get(id)?, vars)
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
