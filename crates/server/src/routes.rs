//! HTTP request handlers.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Answer a question through the orchestrator.
///
/// Always 200 once the body parses: agent failures are part of the answer text.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    tracing::info!(question_len = request.question.len(), "Chat request");

    let routed = state.orchestrator.run_detailed(&request.question).await;
    tracing::debug!(category = %routed.category, "Chat answered");

    Json(ChatResponse {
        answer: routed.answer,
    })
}
