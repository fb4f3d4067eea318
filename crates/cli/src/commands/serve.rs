//! Serve command handler.

use clap::Args;
use meridian_agents::Orchestrator;
use meridian_core::{config::AppConfig, AppError, AppResult};
use meridian_server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (default: server.bind from config, 127.0.0.1:8000)
    #[arg(long, env = "MERIDIAN_BIND")]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");
        config.validate()?;

        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        // Agents and indexes are built once, before the first request
        let orchestrator = Arc::new(Orchestrator::from_config(config)?);
        let state = Arc::new(AppState::new(orchestrator));

        meridian_server::serve(state, addr).await
    }
}
