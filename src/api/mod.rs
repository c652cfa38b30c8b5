//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ai-chat", post(chat_handler))
        .route("/breathing", post(create_breathing_handler))
        .route("/breathing/:id", get(get_breathing_handler).delete(delete_breathing_handler))
        .route("/breathing/:id/start", post(start_breathing_handler))
        .route("/breathing/:id/pause", post(pause_breathing_handler))
        .route("/breathing/:id/reset", post(reset_breathing_handler))
        .route("/breathing/:id/pattern", put(set_pattern_handler))
        .route("/memory", post(create_memory_handler))
        .route("/memory/:id", get(get_memory_handler).delete(delete_memory_handler))
        .route("/memory/:id/start", post(start_memory_handler))
        .route("/memory/:id/reveal", post(reveal_tile_handler))
        .route("/memory/:id/new-game", post(new_memory_game_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
