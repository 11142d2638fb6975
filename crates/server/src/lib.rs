//! Bistro Server - Restaurant ordering HTTP API.
//!
//! Exposes menu browsing, cart management, order placement, and role-based
//! staff administration as a JSON API. Three roles exist: customer (the
//! default), delivery crew, and manager, determined per request by staff
//! group membership.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`db`] - `SQLite` persistence layer (one repository per aggregate)
//! - [`middleware`] - Token authentication extractors
//! - [`policy`] - Role resolution and order visibility scoping
//! - [`routes`] - Request handlers
//!
//! The router is built by [`app`] so integration tests can drive it
//! in-process without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod policy;
pub mod routes;
pub mod state;

use state::AppState;

/// Build the application router around shared state.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check; does not touch dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check; verifies the database answers before reporting OK.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
