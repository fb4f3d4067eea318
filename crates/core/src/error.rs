//! Error types for Meridian.
//!
//! One enum covers every failure category in the workspace: configuration,
//! I/O, LLM backends, knowledge bases, prompts, agents and the web agent's
//! output parser.

use thiserror::Error;

/// Unified error type for Meridian.
///
/// Library functions return `Result<T, AppError>`. The orchestrator is the
/// only place where errors are turned into prose for the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Agent execution errors (unknown tool, iteration limit, ...)
    #[error("Agent error: {0}")]
    Agent(String),

    /// An `Action:` without a usable `Action Input:` in model output
    #[error("Could not parse model output: {0}")]
    Parse(String),

    /// The agent does not support the requested invocation shape
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
