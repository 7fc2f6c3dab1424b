//! HTTP surface of the session token service.

pub mod error;
pub mod extract;
pub mod handlers;

pub use error::{ApiError, ErrorResponse};

use crate::engine::RotationEngine;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub engine: RotationEngine,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy_headers: bool,
}

impl AppState {
    pub const fn new(engine: RotationEngine, trust_proxy_headers: bool) -> Self {
        Self {
            engine,
            trust_proxy_headers,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tokens", get(handlers::issue_tokens))
        .route("/uuid", post(handlers::whoami))
        .route("/refresh", post(handlers::refresh_tokens))
        .route("/logout", post(handlers::logout))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
