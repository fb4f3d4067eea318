//! Meridian CLI
//!
//! Main entry point for the meridian command-line tool.
//! Routes questions to the food-security, clinical and web agents, serves
//! them over HTTP and manages the two knowledge bases.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ClassifyCommand, IngestCommand, ServeCommand, StatsCommand};
use meridian_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;

/// Meridian - question routing over retrieval-augmented agents
#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(about = "Question routing over retrieval-augmented agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "MERIDIAN_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.meridian/config.yaml)
    #[arg(short, long, global = true, env = "MERIDIAN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "MERIDIAN_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "MERIDIAN_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (POST /chat, GET /health)
    Serve(ServeCommand),

    /// Route a question and print the answer
    Ask(AskCommand),

    /// Print the category a question would be routed to
    Classify(ClassifyCommand),

    /// Learn sources into the food or clinical knowledge base
    Ingest(IngestCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Serve(_) => "serve",
            Self::Ask(_) => "ask",
            Self::Classify(_) => "classify",
            Self::Ingest(_) => "ingest",
            Self::Stats(_) => "stats",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let log_format = config
        .log_format
        .as_deref()
        .map(LogFormat::parse)
        .unwrap_or_default();
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("Meridian CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Classify(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
