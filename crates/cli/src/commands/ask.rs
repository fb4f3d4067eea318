//! Ask command handler.

use clap::Args;
use meridian_agents::Orchestrator;
use meridian_core::{config::AppConfig, AppResult};

/// Route a question and print the answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON (`{"category": ..., "answer": ...}`)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        config.validate()?;

        let orchestrator = Orchestrator::from_config(config)?;
        let routed = orchestrator.run_detailed(&self.question).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&routed)?);
        } else {
            println!("{}", routed.answer);
        }

        Ok(())
    }
}
