//! Stats command handler.

use super::BaseArg;
use clap::Args;
use meridian_core::{config::AppConfig, AppResult};

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Knowledge base
    #[arg(value_enum)]
    pub base: BaseArg,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let dir = self.base.dir(config);
        tracing::info!("Executing stats command for {:?}", dir);

        let stats = meridian_knowledge::stats(&dir)?;

        if self.json {
            let output = serde_json::json!({
                "base": stats.base_name,
                "path": dir,
                "sourcesCount": stats.sources_count,
                "chunksCount": stats.chunks_count,
                "dbSizeBytes": stats.db_size_bytes,
                "lastLearnAt": stats.last_learn_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Knowledge base: {} ({})", stats.base_name, dir.display());
            println!("  Sources:  {}", stats.sources_count);
            println!("  Chunks:   {}", stats.chunks_count);
            println!("  DB size:  {} bytes", stats.db_size_bytes);
            match stats.last_learn_at {
                Some(at) => println!("  Learned:  {}", at.to_rfc3339()),
                None => println!("  Learned:  never"),
            }
        }

        Ok(())
    }
}
