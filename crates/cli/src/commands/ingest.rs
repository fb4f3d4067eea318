//! Ingest command handler.

use super::BaseArg;
use clap::Args;
use meridian_core::{config::AppConfig, AppResult};
use meridian_knowledge::{EmbeddingConfig, LearnOptions};
use std::path::PathBuf;

/// Learn sources into a knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Knowledge base to fill
    #[arg(value_enum)]
    pub base: BaseArg,

    /// Files or directories to learn from (.pdf, .csv, .md, .html, .txt)
    #[arg(long, required = true)]
    pub path: Vec<PathBuf>,

    /// Reset base before learning
    #[arg(long)]
    pub reset: bool,

    /// Chunk size in bytes (default: 1000)
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Overlap between chunks in bytes (default: 200 for food, 100 for clinical)
    #[arg(long)]
    pub chunk_overlap: Option<u32>,

    /// Embedding provider for a new or reset base (trigram, openai, ollama)
    #[arg(long)]
    pub embedding_provider: Option<String>,

    /// Embedding model for a new or reset base
    #[arg(long, requires = "embedding_provider")]
    pub embedding_model: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let dir = self.base.dir(config);
        tracing::info!("Executing ingest command for {:?}", dir);

        // Domain defaults only seed a base that has no config yet
        let is_new = self.reset || !meridian_knowledge::config::get_config_path(&dir).exists();
        let (default_size, default_overlap) = self.base.domain().default_chunking();

        let options = LearnOptions {
            paths: self.path.clone(),
            reset: self.reset,
            chunk_size: self.chunk_size.or(is_new.then_some(default_size)),
            chunk_overlap: self.chunk_overlap.or(is_new.then_some(default_overlap)),
            embedding: self.embedding_config(),
        };

        let api_key = config.resolve_api_key("openai");
        let stats = meridian_knowledge::learn(&dir, options, api_key.as_deref()).await?;

        if self.json {
            let output = serde_json::json!({
                "base": self.base.domain().as_str(),
                "path": dir,
                "sourcesCount": stats.sources_count,
                "skippedCount": stats.skipped_count,
                "failedCount": stats.failed_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Learned {} sources ({} chunks, {} bytes) in {:.2}s",
                stats.sources_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
            if stats.skipped_count > 0 {
                println!("Skipped {} unchanged sources", stats.skipped_count);
            }
            if stats.failed_count > 0 {
                println!("Failed to learn {} sources (see log)", stats.failed_count);
            }
        }

        Ok(())
    }

    fn embedding_config(&self) -> Option<EmbeddingConfig> {
        let provider = self.embedding_provider.as_ref()?;
        let defaults = EmbeddingConfig::default();

        let model = self.embedding_model.clone().unwrap_or_else(|| {
            match provider.as_str() {
                "openai" => "text-embedding-3-small",
                "ollama" => "nomic-embed-text",
                _ => "trigram-v1",
            }
            .to_string()
        });
        let dimensions = match provider.as_str() {
            "ollama" => 768,
            _ => defaults.dimensions,
        };

        Some(EmbeddingConfig {
            provider: provider.clone(),
            model,
            dimensions,
            ..defaults
        })
    }
}
