//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use meridian_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the user template and the optional system template are rendered with
/// the same variables. Missing variables render as empty strings.
///
/// # Example
/// ```no_run
/// use meridian_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is food insecurity?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|system| render_template(system, &variables))
        .transpose()?;

    Ok(BuiltPrompt {
        system,
        user,
        source_prompt_id: definition.id.clone(),
        resolved_variables: variables,
    })
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(template: &str, system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            system: system.map(str::to_string),
            template: template.to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "<b>\"rice\" & wheat</b>".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "<b>\"rice\" & wheat</b>");
    }

    #[test]
    fn test_build_prompt_renders_system() {
        let def = definition("Q: {{question}}", Some("Tools: {{tools}}"));
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "capital of France?".to_string());
        vars.insert("tools".to_string(), "web_search".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Q: capital of France?");
        assert_eq!(built.system.as_deref(), Some("Tools: web_search"));
        assert_eq!(built.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let result = render_template("Question: {{missing}}", &HashMap::new()).unwrap();
        assert_eq!(result, "Question: ");
    }

    #[test]
    fn test_invalid_template_is_prompt_error() {
        let result = render_template("{{#each items}}unclosed", &HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
