//! The answer-producing agent contract.

use meridian_core::{AppError, AppResult};

/// An answer-producing agent.
///
/// Agents expose one of two call shapes. `answer` is the primary one;
/// `run` is the older single-shot entry point. Both default to
/// [`AppError::Unsupported`], so an agent implements whichever it has and
/// the orchestrator falls back from one to the other.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Answer a question.
    async fn answer(&self, question: &str) -> AppResult<String> {
        let _ = question;
        Err(AppError::Unsupported(format!(
            "{} agent does not implement answer",
            self.name()
        )))
    }

    /// Legacy entry point.
    async fn run(&self, question: &str) -> AppResult<String> {
        let _ = question;
        Err(AppError::Unsupported(format!(
            "{} agent does not implement run",
            self.name()
        )))
    }
}
