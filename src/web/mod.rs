//! # Web API Module
//!
//! Thin axum layer over the relay. The upstream session collaborator
//! identifies the user via the `x-chat-user` header.
//!
//! - [`routes`] - route table
//! - [`handlers`] - request handlers
//! - [`extractors`] - `SessionContext` and `AuthenticatedUser`
//! - [`errors`] - `ApiError` and its JSON rendering
//! - [`state`] - shared `AppState`

pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use errors::ApiError;
pub use extractors::{AuthenticatedUser, SessionContext};
pub use state::AppState;

/// Build the router with all routes and the tracing layer
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::chat_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
