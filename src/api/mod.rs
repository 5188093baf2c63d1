//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_handler))
        .route("/timers/:slot", get(get_handler))
        .route("/timers/:slot/start", post(start_handler))
        .route("/timers/:slot/stop", post(stop_handler))
        .route("/timers/:slot/reset", post(reset_handler))
        .route("/timers/:slot/manual", post(manual_handler))
        .route("/timers/:slot/edit", post(edit_handler))
        .route("/timers/:slot/save", post(save_handler))
        .route("/lifecycle/background", post(background_handler))
        .route("/lifecycle/foreground", post(foreground_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
