//! HTTP surface for Meridian.
//!
//! # Endpoints
//! - `POST /chat` - `{"question": "..."}` -> `{"answer": "..."}`
//! - `GET /health` - Health check

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use meridian_core::AppResult;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Create the router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/chat", post(routes::chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> AppResult<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Meridian server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
