// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: main router assembly
// - health.rs: health check and metrics endpoints
// - messages.rs: message ingestion, history, and read-marking endpoints
//
// ============================================================================

mod health;
mod messages;

use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    Router::new()
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Messages
        .route(
            "/messages",
            post(messages::send_message).get(messages::get_messages),
        )
        .route("/messages/:message_id/read", patch(messages::mark_read))
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(app_context)
}
