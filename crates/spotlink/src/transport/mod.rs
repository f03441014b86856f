// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP adapter: exposes the roster, command dispatch and outboxes of a
//! [`LocalHost`](host::LocalHost) driving the engine.

pub mod auth;
pub mod host;
pub mod http;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;
use crate::transport::host::LocalHost;

/// Shared state for the HTTP handlers.
pub struct AppState {
    pub engine: Arc<Engine>,
    pub host: Arc<LocalHost>,
    pub auth_token: Option<String>,
}

/// Build the axum `Router` with all adapter routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(http::health))
        // Roster
        .route("/api/v1/roster", get(http::roster))
        .route("/api/v1/roster/{identity}", put(http::join).delete(http::part))
        // Per-identity
        .route("/api/v1/roster/{identity}/commands", post(http::command))
        .route("/api/v1/roster/{identity}/messages", get(http::messages))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
