//! HTTP front end
//!
//! `POST /mcp` speaks MCP over JSON-RPC 2.0 behind the bearer-token gate;
//! `GET /health` is always open.

pub mod handlers;
pub mod protocol;
pub mod security;

use crate::tools::ToolRegistry;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use security::{security_middleware, SecurityState};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: ToolRegistry,
}

/// Build the complete router
pub fn create_router(registry: ToolRegistry, security: SecurityState, timeout: Duration) -> Router {
    let app_state = AppState { registry };

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/mcp",
            post(handlers::mcp).route_layer(middleware::from_fn_with_state(
                security,
                security_middleware,
            )),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
