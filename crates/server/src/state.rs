//! Shared state for request handlers.

use meridian_agents::Orchestrator;
use std::sync::Arc;
use std::time::Instant;

/// State shared by every request.
pub struct AppState {
    /// Routes questions to agents; immutable after start-up
    pub orchestrator: Arc<Orchestrator>,

    /// Server start time (for health checks)
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Instant::now(),
        }
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
