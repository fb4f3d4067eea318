//! Parsing of one reasoning step from model output.

use meridian_core::{AppError, AppResult};

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";

/// What the model asked for in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Call `tool` with `input` and continue.
    Act { tool: String, input: String },
    /// Stop with this answer.
    Finish(String),
}

/// Parse model output into a [`Step`].
///
/// A `Final Answer:` marker wins over an action. `Action:` and
/// `Action Input:` only count at the start of a line, so prose that mentions
/// them is taken as the answer itself. An `Action:` line with no
/// `Action Input:` is an [`AppError::Parse`]. The input is the rest of its
/// line; anything the model wrote after it is ignored.
pub fn parse_step(text: &str) -> AppResult<Step> {
    if let Some(idx) = text.find(FINAL_ANSWER) {
        let answer = text[idx + FINAL_ANSWER.len()..].trim();
        return Ok(Step::Finish(answer.to_string()));
    }

    let lines: Vec<&str> = text.lines().collect();
    let Some((action_line, rest)) = line_starting_with(&lines, ACTION) else {
        return Ok(Step::Finish(text.trim().to_string()));
    };

    let (tool, input) = match rest.find(ACTION_INPUT) {
        Some(idx) => (&rest[..idx], Some(&rest[idx + ACTION_INPUT.len()..])),
        None => (
            rest,
            line_starting_with(&lines[action_line + 1..], ACTION_INPUT).map(|(_, input)| input),
        ),
    };

    let tool = tool.trim();
    if tool.is_empty() {
        return Err(AppError::Parse(format!("Empty tool name in: {}", text.trim())));
    }

    let input = input.ok_or_else(|| {
        AppError::Parse(format!(
            "'{}' without '{}' in: {}",
            ACTION,
            ACTION_INPUT,
            text.trim()
        ))
    })?;

    Ok(Step::Act {
        tool: tool.to_string(),
        input: input.trim().trim_matches('"').trim().to_string(),
    })
}

/// First line whose trimmed start is `marker`, with the text after it.
fn line_starting_with<'a>(lines: &[&'a str], marker: &str) -> Option<(usize, &'a str)> {
    lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| line.trim_start().strip_prefix(marker).map(|rest| (i, rest)))
}
