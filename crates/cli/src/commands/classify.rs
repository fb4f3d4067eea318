//! Classify command handler.

use clap::Args;
use meridian_agents::Classifier;
use meridian_core::{config::AppConfig, AppResult};

/// Print the category a question would be routed to
#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// The question to classify
    pub question: String,
}

impl ClassifyCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing classify command");
        config.validate()?;

        let classifier = Classifier::from_config(config)?;
        println!("{}", classifier.classify(&self.question).await);

        Ok(())
    }
}
