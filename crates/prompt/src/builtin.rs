//! Prompts compiled into the binary.
//!
//! Each of these can be replaced by a workspace override with the same id.

use crate::types::{ids, PromptDefinition};

const CLASSIFY_TEMPLATE: &str = r#"You are a classifier. The user question is: "{{question}}".
Decide which category the question belongs to:
- food: United Nations food security, hunger, nutrition, agriculture, food prices and related reports
- clinical: clinical studies and trials, patients, treatments, conditions and study registry data
- web: anything else, general knowledge that needs a web lookup
Respond with exactly one word: food, clinical or web."#;

const FOOD_TEMPLATE: &str = r#"You are an expert on United Nations food security.
You have access to the following document excerpts:
{{context}}

User's question: {{question}}

Provide a concise, accurate answer based only on the given context.
If the answer is not in the context, say 'I'm not sure based on the information I have.'"#;

const CLINICAL_TEMPLATE: &str = r#"You are an expert in clinical studies.
You have access to structured study documents.
User's question: {{question}}

Given the data:
{{context}}

Provide a clear, concise answer using only the data above, referencing relevant studies if possible.
If the data does not have the info, say "I do not have that information.""#;

const WEB_SYSTEM: &str = "You are a helpful AI that can use the 'web_search' tool to answer questions. \
If you need external information, call the tool. If you can answer directly, you may do so.";

const WEB_TEMPLATE: &str = r#"Answer the following question as best you can. You have access to the following tools:

{{tools}}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{{tool_names}}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {{question}}
Thought:{{scratchpad}}"#;

fn definition(id: &str, title: &str, system: Option<&str>, template: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        created_by: "meridian".to_string(),
        system: system.map(str::to_string),
        template: template.to_string(),
    }
}

/// All built-in prompt definitions.
pub fn builtin_prompts() -> Vec<PromptDefinition> {
    vec![
        definition(ids::CLASSIFY, "Question classifier", None, CLASSIFY_TEMPLATE),
        definition(ids::FOOD, "Food security answer", None, FOOD_TEMPLATE),
        definition(ids::CLINICAL, "Clinical study answer", None, CLINICAL_TEMPLATE),
        definition(ids::WEB, "Web search reasoning step", Some(WEB_SYSTEM), WEB_TEMPLATE),
    ]
}
