//! # Route Definitions

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Session-scoped chat routes
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/send", post(handlers::messages::send_message))
        .route("/messages", get(handlers::messages::list_messages))
        .route("/mark-read/:id", post(handlers::messages::mark_read))
        .route("/delete/:id", post(handlers::messages::delete_message))
}

/// Unauthenticated monitoring routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/stats", get(handlers::health::relay_stats))
}
